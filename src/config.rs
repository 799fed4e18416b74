//! Client configuration

use crate::error::{ClientError, Result};
use crate::types::MAX_TOKEN_TTL;
use std::time::Duration;
use url::Url;

const DEFAULT_ORIGIN: &str = "http://localhost:8000";
const DEFAULT_BASE_PATH: &str = "/api/v1";

/// Lifetime assumed for an access token when the server omits `expires_in`.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 1800;
/// How long before expiry a token is refreshed proactively.
pub const DEFAULT_REFRESH_BUFFER_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Pulse client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme + host (+ port) of the backend
    pub origin: Url,

    /// Path prefix of the REST API
    /// Default: `/api/v1`
    pub base_path: String,

    /// Access token lifetime used when the server does not send one
    /// Default: 1800 seconds
    pub token_ttl_secs: u64,

    /// Refresh threshold in seconds (refresh when this many seconds before expiry)
    /// Default: 60 seconds
    pub refresh_buffer_secs: u64,

    /// Per-request timeout
    /// Default: 30 seconds
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            base_path: DEFAULT_BASE_PATH.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            refresh_buffer_secs: DEFAULT_REFRESH_BUFFER_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Parse `origin` and build a config with defaults for everything else.
    pub fn for_origin(origin: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(origin)?))
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `PULSE_API_ORIGIN`: backend origin (default `http://localhost:8000`)
    /// - `PULSE_API_BASE_PATH`: API prefix (default `/api/v1`)
    /// - `PULSE_TOKEN_TTL_SECS`: fallback access token lifetime
    /// - `PULSE_REFRESH_BUFFER_SECS`: proactive refresh window
    /// - `PULSE_REQUEST_TIMEOUT_SECS`: per-request timeout
    pub fn from_env() -> Result<Self> {
        let origin = std::env::var("PULSE_API_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_string());
        let origin = Url::parse(&origin)
            .map_err(|e| ClientError::Configuration(format!("PULSE_API_ORIGIN: {e}")))?;

        let mut config = Self::new(origin);

        if let Ok(path) = std::env::var("PULSE_API_BASE_PATH") {
            config = config.with_base_path(path);
        }
        if let Some(secs) = env_secs("PULSE_TOKEN_TTL_SECS")? {
            config = config.with_token_ttl_secs(secs);
        }
        if let Some(secs) = env_secs("PULSE_REFRESH_BUFFER_SECS")? {
            config = config.with_refresh_buffer_secs(secs);
        }
        if let Some(secs) = env_secs("PULSE_REQUEST_TIMEOUT_SECS")? {
            config = config.with_request_timeout_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = path.into();
        self
    }

    pub fn with_token_ttl_secs(mut self, secs: u64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    pub fn with_refresh_buffer_secs(mut self, secs: u64) -> Self {
        self.refresh_buffer_secs = secs;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !matches!(self.origin.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "unsupported origin scheme: {}",
                self.origin.scheme()
            )));
        }
        if self.token_ttl_secs == 0 {
            return Err(ClientError::Configuration(
                "token lifetime must be positive".to_string(),
            ));
        }
        if self.token_ttl_secs > MAX_TOKEN_TTL.as_secs() {
            return Err(ClientError::Configuration(format!(
                "token lifetime must not exceed {} seconds",
                MAX_TOKEN_TTL.as_secs()
            )));
        }
        if self.refresh_buffer_secs >= self.token_ttl_secs {
            return Err(ClientError::Configuration(format!(
                "refresh buffer ({}s) must be shorter than the token lifetime ({}s)",
                self.refresh_buffer_secs, self.token_ttl_secs
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ClientError::Configuration(
                "request timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute API root without trailing slash, e.g. `http://localhost:8000/api/v1`
    pub fn api_url(&self) -> String {
        let origin = self.origin.as_str().trim_end_matches('/');
        let path = self.base_path.trim_matches('/');
        if path.is_empty() {
            origin.to_string()
        } else {
            format!("{origin}/{path}")
        }
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn refresh_buffer(&self) -> Duration {
        Duration::from_secs(self.refresh_buffer_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_secs(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ClientError::Configuration(format!("{name}: {e}"))),
        Err(_) => Ok(None),
    }
}
