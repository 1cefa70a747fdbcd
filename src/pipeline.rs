use std::time::Duration;

use log::{info, warn};
use reqwest::Client;

use crate::config::Credentials;
use crate::dreams::DreamSource;
use crate::error::{Error, Result};
use crate::lyrics::LyricsComposer;
use crate::song::{SongRenderer, SongResult};

/// What one run of the composer produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The sheet opened fine but held no dreams; nothing was generated.
    NoDreams,
    Composed {
        dreams: Vec<String>,
        lyrics: String,
        song: SongResult,
    },
}

/// Build the HTTP client shared by all three services.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!("dream-song/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))
}

/// Sheet, then lyrics, then song, one after the other.
pub struct Pipeline {
    dreams: DreamSource,
    composer: LyricsComposer,
    renderer: SongRenderer,
}

impl Pipeline {
    pub fn new(dreams: DreamSource, composer: LyricsComposer, renderer: SongRenderer) -> Self {
        Self {
            dreams,
            composer,
            renderer,
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        let http = http_client()?;
        Ok(Self::new(
            DreamSource::new(http.clone(), credentials.service_account.clone()),
            LyricsComposer::new(http.clone(), &credentials.openai_api_key),
            SongRenderer::new(http, &credentials.suno_api_key),
        ))
    }

    /// Run all three steps for one sheet.
    ///
    /// Stops after the sheet read when it holds no dreams.
    pub async fn run(&self, sheet_url: &str) -> Result<Outcome> {
        let dreams = self.dreams.fetch_dreams(sheet_url).await?;
        if dreams.is_empty() {
            warn!("No dreams found in the sheet");
            return Ok(Outcome::NoDreams);
        }

        let lyrics = self.composer.generate_combined_lyrics(&dreams).await?;
        let song = self.renderer.send_to_suno(&lyrics).await?;
        info!("Song request finished");

        Ok(Outcome::Composed {
            dreams,
            lyrics,
            song,
        })
    }
}
