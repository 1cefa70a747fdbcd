use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const OPENAI_API: &str = "https://api.openai.com";
pub const MODEL: &str = "gpt-4";
pub const TEMPERATURE: f64 = 0.9;

/// Build the songwriting prompt, one dash-prefixed dream per line.
pub fn build_prompt(dreams: &[String]) -> String {
    let combined = dreams
        .iter()
        .map(|dream| format!("- {dream}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "
You are a poetic songwriter. Write a song that weaves together the following dreams into a beautiful, emotional piece with verses and chorus.

Dreams:
{combined}

Write the lyrics in song format.
"
    )
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Turns dreams into lyrics with a chat completion model.
pub struct LyricsComposer {
    http: Client,
    api_key: String,
    api_base: String,
}

impl LyricsComposer {
    pub fn new(http: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(http, api_key, OPENAI_API)
    }

    pub fn with_base_url(
        http: Client,
        api_key: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Ask the model for one song weaving all the dreams together.
    ///
    /// The first choice is returned with surrounding whitespace trimmed; its length is not capped.
    pub async fn generate_combined_lyrics(&self, dreams: &[String]) -> Result<String> {
        let prompt = build_prompt(dreams);
        let request = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: TEMPERATURE,
        };

        info!("Composing lyrics from {} dreams", dreams.len());
        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!("{status}: {body}")));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("malformed completion: {e}")))?;

        let lyrics = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("completion has no content".to_string()))?;

        let lyrics = lyrics.trim().to_string();
        debug!("Received {} characters of lyrics", lyrics.len());
        Ok(lyrics)
    }
}
