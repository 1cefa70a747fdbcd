use std::fmt;

use log::{info, warn};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

pub const SUNO_API: &str = "https://api.suno.ai";
pub const STYLE: &str = "pop";

/// Stands in for the URL when the service answers without one
pub const SONG_URL_NOT_FOUND: &str = "Song URL not found.";

/// What the music service made of the lyrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongResult {
    /// The service accepted the lyrics. Holds [`SONG_URL_NOT_FOUND`] if it sent no `song_url`.
    Url(String),
    /// The service answered with a non-success status.
    Failed { status: u16, body: String },
}

impl SongResult {
    pub fn url(&self) -> Option<&str> {
        match self {
            SongResult::Url(url) => Some(url.as_str()),
            SongResult::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SongResult::Failed { .. })
    }
}

/// Renders the result as a single line, the way it was shown before the two cases were split.
impl fmt::Display for SongResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongResult::Url(url) => f.write_str(url),
            SongResult::Failed { body, .. } => write!(f, "Error from Suno: {body}"),
        }
    }
}

/// Interpret a response from the generate endpoint.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<SongResult> {
    if !status.is_success() {
        return Ok(SongResult::Failed {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let body: Value = serde_json::from_str(body)
        .map_err(|e| Error::Render(format!("malformed response: {e}")))?;
    let fields = body
        .as_object()
        .ok_or_else(|| Error::Render(format!("expected a JSON object, got {body}")))?;
    let url = fields
        .get("song_url")
        .and_then(Value::as_str)
        .unwrap_or(SONG_URL_NOT_FOUND);

    Ok(SongResult::Url(url.to_string()))
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    lyrics: &'a str,
    style: &'a str,
}

/// Sends lyrics to the music generation service.
pub struct SongRenderer {
    http: Client,
    api_key: String,
    api_base: String,
}

impl SongRenderer {
    pub fn new(http: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(http, api_key, SUNO_API)
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

    /// Request a song for the lyrics.
    ///
    /// An error status from the service comes back as [`SongResult::Failed`], not as an `Err`.
    pub async fn send_to_suno(&self, lyrics: &str) -> Result<SongResult> {
        let request = GenerateRequest {
            lyrics,
            style: STYLE,
        };

        info!("Sending lyrics to Suno");
        let response = self
            .http
            .post(format!("{}/generate", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Render(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Render(e.to_string()))?;

        let result = interpret_response(status, &body)?;
        if result.is_failure() {
            warn!("Suno answered {status}");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn success_returns_song_url() {
        let result =
            interpret_response(StatusCode::OK, r#"{"song_url": "https://example.com/song123"}"#)
                .unwrap();
        assert_eq!(result, SongResult::Url("https://example.com/song123".to_string()));
        assert_eq!(result.url(), Some("https://example.com/song123"));
    }

    #[test]
    fn success_without_url_falls_back() {
        let result = interpret_response(StatusCode::OK, r#"{"id": "abc"}"#).unwrap();
        assert_eq!(result.to_string(), "Song URL not found.");
        assert!(!result.is_failure());
    }

    #[test]
    fn non_string_url_falls_back() {
        let result = interpret_response(StatusCode::OK, r#"{"song_url": null}"#).unwrap();
        assert_eq!(result, SongResult::Url(SONG_URL_NOT_FOUND.to_string()));
    }

    #[test]
    fn error_status_is_a_value() {
        let result = interpret_response(StatusCode::TOO_MANY_REQUESTS, "rate limited").unwrap();
        assert_eq!(
            result,
            SongResult::Failed {
                status: 429,
                body: "rate limited".to_string()
            }
        );
        assert_eq!(result.to_string(), "Error from Suno: rate limited");
        assert_eq!(result.url(), None);
    }

    #[test]
    fn rendered_failure_looks_like_any_other_result() {
        // Once flattened to text, only the content tells the two cases apart
        let failure = interpret_response(StatusCode::BAD_GATEWAY, "rate limited").unwrap();
        let success = interpret_response(StatusCode::OK, r#"{"song_url": "https://x/1"}"#).unwrap();

        let rendered: [String; 2] = [failure.to_string(), success.to_string()];
        assert!(rendered[0].starts_with("Error from Suno: "));
        assert!(rendered[0].contains("rate limited"));
        assert_eq!(rendered[1], "https://x/1");
    }

    #[test]
    fn malformed_success_body_is_an_error() {
        let result = interpret_response(StatusCode::OK, "<html>oops</html>");
        assert!(matches!(result, Err(Error::Render(_))));
    }

    #[test]
    fn non_object_success_body_is_an_error() {
        for body in ["[]", "\"https://x/1\"", "null"] {
            let result = interpret_response(StatusCode::OK, body);
            assert!(matches!(result, Err(Error::Render(_))), "{body} should be rejected");
        }
    }

    #[test]
    fn request_carries_fixed_style() {
        let request = GenerateRequest {
            lyrics: "la la la",
            style: STYLE,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"lyrics": "la la la", "style": "pop"})
        );
    }
}
