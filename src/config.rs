use std::{env, fmt, fs};

use log::debug;

use crate::auth::ServiceAccountKey;
use crate::error::{Error, Result};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const SUNO_API_KEY: &str = "SUNO_API_KEY";
pub const GCP_SERVICE_ACCOUNT: &str = "GCP_SERVICE_ACCOUNT";

/// The three secrets the composer needs, read once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub suno_api_key: String,
    pub service_account: ServiceAccountKey,
}

impl Credentials {
    /// Read credentials from the process environment, loading `.env` first if there is one.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded .env from {}", path.display()),
            Err(e) => debug!("No .env file loaded: {e}"),
        }

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    ///
    /// `GCP_SERVICE_ACCOUNT` may hold either the key JSON itself or a path to the key file.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(Error::MissingSecret(name))
        };

        let openai_api_key = secret(OPENAI_API_KEY)?;
        let suno_api_key = secret(SUNO_API_KEY)?;
        let service_account = load_service_account(&secret(GCP_SERVICE_ACCOUNT)?)?;

        Ok(Self {
            openai_api_key,
            suno_api_key,
            service_account,
        })
    }
}

fn load_service_account(raw: &str) -> Result<ServiceAccountKey> {
    let raw = raw.trim();
    if raw.starts_with('{') {
        return ServiceAccountKey::from_json(raw);
    }

    let json = fs::read_to_string(raw)
        .map_err(|e| Error::Config(format!("cannot read service account key {raw}: {e}")))?;
    ServiceAccountKey::from_json(&json)
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("suno_api_key", &"<redacted>")
            .field("service_account", &self.service_account)
            .finish()
    }
}
