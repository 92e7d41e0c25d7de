//! Connection settings for `DixaClient`.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://integrations.dixa.io";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

pub const ENV_TOKEN: &str = "DIXA_API_TOKEN";
pub const ENV_BASE_URL: &str = "DIXA_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "DIXA_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidVar { name: &'static str, value: String },
}

/// Immutable connection settings. The token is sent verbatim as the
/// `Authorization` header; no scheme prefix is added.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    token: String,
    content_type: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            timeout: None,
        }
    }

    /// Read settings from `DIXA_API_TOKEN`, `DIXA_BASE_URL` and
    /// `DIXA_TIMEOUT_SECS`. Only the token is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(ENV_TOKEN).ok_or(ConfigError::MissingVar(ENV_TOKEN))?;
        let mut config = Self::new(token);
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(&base_url);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

// Keeps the token out of logs and panic messages.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("content_type", &self.content_type)
            .field("timeout", &self.timeout)
            .finish()
    }
}
