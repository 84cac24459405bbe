//! Connection settings shared by the remote clients.

use crate::error::{LlmError, Result};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where and how to reach a hosted chat model.
#[derive(Clone)]
pub struct RemoteLlmConfig {
    pub api_key: String,

    /// API root without a trailing slash, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,

    pub model: String,

    /// Whole-request timeout, connect included.
    pub timeout: Duration,
}

impl RemoteLlmConfig {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the API key from `env_var`; blank values count as missing.
    pub fn from_env(
        env_var: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key, base_url, model)),
            _ => Err(LlmError::ApiKeyNotFound(format!(
                "Environment variable: {}",
                env_var
            ))),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for RemoteLlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteLlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
