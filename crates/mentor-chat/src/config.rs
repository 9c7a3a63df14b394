use std::time::Duration;

use crate::errors::ChatError;

const ENDPOINT_ENV: &str = "MENTOR_CHAT_URL";
const API_KEY_ENV: &str = "MENTOR_CHAT_API_KEY";
const TIMEOUT_ENV: &str = "MENTOR_CHAT_TIMEOUT_SECS";

/// Configuration for the HTTP chat client.
#[derive(Clone, Debug)]
pub struct ChatClientConfig {
    /// Full URL of the streaming chat function.
    pub endpoint: String,
    /// Key sent as the bearer token.
    pub api_key: String,
    /// Default HTTP timeout for requests.
    pub timeout: Duration,
}

impl ChatClientConfig {
    /// Creates a config with the default timeout.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds a config from `MENTOR_CHAT_URL`, `MENTOR_CHAT_API_KEY` and the
    /// optional `MENTOR_CHAT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ChatError> {
        let endpoint = required_env(ENDPOINT_ENV)?;
        let api_key = required_env(API_KEY_ENV)?;
        let mut config = Self::new(endpoint, api_key);
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ChatError::Config(format!("{TIMEOUT_ENV} must be a whole number of seconds"))
            })?;
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ChatError> {
        if self.endpoint.trim().is_empty() {
            return Err(ChatError::Config("chat endpoint must not be empty".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ChatError::Config("chat api_key must not be empty".into()));
        }
        Ok(())
    }
}

fn required_env(key: &str) -> Result<String, ChatError> {
    let value = std::env::var(key).unwrap_or_default();
    if value.trim().is_empty() {
        return Err(ChatError::Config(format!("missing {key}")));
    }
    Ok(value)
}
