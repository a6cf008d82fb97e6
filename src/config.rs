use crate::{LastFmError, Result};
use std::env;

/// Default Last.fm API root.
pub const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

pub const API_KEY_VAR: &str = "LASTFM_API_KEY";
pub const API_SECRET_VAR: &str = "LASTFM_API_SECRET";
pub const API_URL_VAR: &str = "LASTFM_API_URL";

/// Client configuration: API credentials and the endpoint to talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Last.fm API key, sent with every request
    pub api_key: String,
    /// Shared secret used to sign authenticated requests (may be empty)
    pub api_secret: String,
    /// API root URL
    pub base_url: String,
}

impl ClientConfig {
    /// Create a config for the public Last.fm endpoint.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root, e.g. a local test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read the configuration from `LASTFM_API_KEY`, `LASTFM_API_SECRET`
    /// and `LASTFM_API_URL`.
    ///
    /// Only the key is required; the secret defaults to empty, which limits
    /// the client to unauthenticated GET requests.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                LastFmError::AuthConfig(format!("{API_KEY_VAR} environment variable not set"))
            })?;
        let api_secret = lookup(API_SECRET_VAR).unwrap_or_default();
        let config = Self::new(api_key, api_secret);

        Ok(match lookup(API_URL_VAR) {
            Some(url) if !url.is_empty() => config.with_base_url(url),
            _ => config,
        })
    }

    /// Whether authenticated (signed) requests can be made.
    pub fn has_secret(&self) -> bool {
        !self.api_secret.is_empty()
    }
}
