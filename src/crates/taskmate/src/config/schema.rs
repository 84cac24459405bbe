//! Configuration schema for taskmate

use crate::error::{Result, TaskmateError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tooling::async_utils::RetryPolicy;
use tooling::config::{expand_env_vars, get_env, get_env_first, get_env_parse, has_unresolved_placeholder};

/// Main taskmate configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskmateConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub lookup: LookupConfig,
}

/// Chat model provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "gemini" or "openai"
    pub provider: String,

    /// Model name; the provider's default when unset
    pub model: Option<String>,

    /// API key (supports `${VAR}` interpolation)
    pub api_key: Option<String>,

    /// API base URL; the provider's default when unset
    pub api_base: Option<String>,

    /// Sampling temperature (0.0-2.0)
    pub temperature: f32,

    /// HTTP timeout per model call, in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini.as_str().to_string(),
            model: None,
            api_key: None,
            api_base: None,
            temperature: crate::classifier::DEFAULT_TEMPERATURE,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    pub fn provider(&self) -> Result<Provider> {
        self.provider.parse()
    }

    /// Configured model, or the provider's default.
    pub fn model_name(&self) -> String {
        match (&self.model, self.provider()) {
            (Some(model), _) => model.clone(),
            (None, Ok(provider)) => provider.default_model().to_string(),
            (None, Err(_)) => String::new(),
        }
    }

    /// Configured base URL, or the provider's default.
    pub fn base_url(&self) -> String {
        match (&self.api_base, self.provider()) {
            (Some(base), _) => base.clone(),
            (None, Ok(provider)) => provider.default_base_url().to_string(),
            (None, Err(_)) => String::new(),
        }
    }
}

/// Supported chat model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAi,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-1.5-flash",
            Provider::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Environment variables consulted when no key is configured.
    pub fn api_key_env(self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            Provider::OpenAi => &["OPENAI_API_KEY"],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = TaskmateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(TaskmateError::Config(format!(
                "Unknown LLM provider '{}' (expected gemini or openai)",
                other
            ))),
        }
    }
}

/// Retry, history and timeout settings for classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Attempts per model call, including the first
    pub max_attempts: usize,

    /// First backoff delay; doubles on each retry
    pub base_delay_ms: u64,

    pub max_delay_ms: u64,

    /// Turns of history kept after the system prompt
    pub history_turns: usize,

    /// Bound on one whole exchange; 0 disables it
    pub exchange_timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
            max_delay_ms: 30_000,
            history_turns: crate::conversation::DEFAULT_HISTORY_TURNS,
            exchange_timeout_secs: 90,
        }
    }
}

impl ClassifierConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts)
            .with_initial_interval(Duration::from_millis(self.base_delay_ms))
            .with_backoff_factor(2.0)
            .with_max_interval(Duration::from_millis(self.max_delay_ms))
    }

    pub fn exchange_timeout(&self) -> Option<Duration> {
        (self.exchange_timeout_secs > 0).then(|| Duration::from_secs(self.exchange_timeout_secs))
    }
}

/// Task store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// "sqlite" or "memory"
    pub backend: String,

    /// Database file path (relative to ~/.taskmate or absolute)
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite.as_str().to_string(),
            path: "taskmate.db".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn backend(&self) -> Result<StoreBackend> {
        match self.backend.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(TaskmateError::Config(format!(
                "Unknown store backend '{}' (expected sqlite or memory)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Memory => "memory",
        }
    }
}

/// External lookup services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub openweather_api_key: Option<String>,
    pub openweather_base: String,
    pub github_base: String,
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            openweather_base: "https://api.openweathermap.org/data/2.5".to_string(),
            github_base: "https://api.github.com".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Expand `${VAR}`; a value still holding a placeholder counts as unset.
fn resolve_secret(value: Option<&String>) -> Option<String> {
    value
        .map(|v| expand_env_vars(v))
        .filter(|v| !v.trim().is_empty() && !has_unresolved_placeholder(v))
}

fn env_error(err: tooling::ToolingError) -> TaskmateError {
    TaskmateError::Config(err.to_string())
}

impl TaskmateConfig {
    /// Resolve `${VAR}` placeholders, then fall back to the conventional
    /// environment variables for unset API keys.
    pub fn resolve_env_vars(&mut self) {
        self.llm.api_key = resolve_secret(self.llm.api_key.as_ref());
        self.llm.api_base = self.llm.api_base.as_deref().map(expand_env_vars);
        self.lookup.openweather_api_key = resolve_secret(self.lookup.openweather_api_key.as_ref());
        self.store.path = expand_env_vars(&self.store.path);

        if self.llm.api_key.is_none() {
            if let Ok(provider) = self.llm.provider() {
                self.llm.api_key = get_env_first(provider.api_key_env()).ok().flatten();
            }
        }
        if self.lookup.openweather_api_key.is_none() {
            self.lookup.openweather_api_key = get_env("OPENWEATHER_API_KEY").ok().flatten();
        }
    }

    /// Apply `TASKMATE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(provider) = get_env("TASKMATE_PROVIDER").map_err(env_error)? {
            self.llm.provider = provider;
        }
        if let Some(model) = get_env("TASKMATE_MODEL").map_err(env_error)? {
            self.llm.model = Some(model);
        }
        if let Some(backend) = get_env("TASKMATE_STORE").map_err(env_error)? {
            self.store.backend = backend;
        }
        if let Some(path) = get_env("TASKMATE_DB_PATH").map_err(env_error)? {
            self.store.path = path;
        }
        if let Some(attempts) = get_env_parse("TASKMATE_MAX_ATTEMPTS").map_err(env_error)? {
            self.classifier.max_attempts = attempts;
        }
        if let Some(turns) = get_env_parse("TASKMATE_HISTORY_TURNS").map_err(env_error)? {
            self.classifier.history_turns = turns;
        }
        Ok(())
    }

    /// Reject settings the assistant cannot start with.
    pub fn validate(&self) -> Result<()> {
        let provider = self.llm.provider()?;
        self.store.backend()?;

        if self.classifier.max_attempts == 0 {
            return Err(TaskmateError::Config(
                "classifier.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(TaskmateError::Config(format!(
                "llm.temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.api_key.is_none() {
            return Err(TaskmateError::Config(format!(
                "No API key for {}: set llm.api_key or {}",
                provider,
                provider.api_key_env().join(" / ")
            )));
        }
        Ok(())
    }

    /// Resolved database path. Relative paths live under ~/.taskmate.
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = PathBuf::from(&self.store.path);
        if path.is_absolute() {
            return Ok(path);
        }

        let home = dirs::home_dir()
            .ok_or_else(|| TaskmateError::Config("Failed to get home directory".to_string()))?;
        Ok(home.join(".taskmate").join(path))
    }

    /// Copy safe to print: secrets replaced.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let mask = |key: &mut Option<String>| {
            if key.is_some() {
                *key = Some("***".to_string());
            }
        };
        mask(&mut copy.llm.api_key);
        mask(&mut copy.lookup.openweather_api_key);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key() -> TaskmateConfig {
        let mut config = TaskmateConfig::default();
        config.llm.api_key = Some("key".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = TaskmateConfig::default();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model_name(), "gemini-1.5-flash");
        assert_eq!(config.classifier.max_attempts, 3);
        assert_eq!(config.classifier.base_delay_ms, 2000);
        assert_eq!(config.classifier.history_turns, 9);
        assert_eq!(config.store.path, "taskmate.db");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TaskmateConfig = toml::from_str(
            r#"
[llm]
provider = "openai"

[classifier]
max_attempts = 5
"#,
        )
        .unwrap();

        assert_eq!(config.llm.model_name(), "gpt-4o-mini");
        assert_eq!(config.llm.base_url(), "https://api.openai.com/v1");
        assert_eq!(config.classifier.max_attempts, 5);
        assert_eq!(config.classifier.base_delay_ms, 2000);
        assert_eq!(config.store.backend, "sqlite");
    }

    #[test]
    fn test_validate() {
        assert!(with_key().validate().is_ok());

        let mut config = with_key();
        config.llm.provider = "claude".into();
        assert!(config.validate().is_err());

        let mut config = with_key();
        config.store.backend = "mongo".into();
        assert!(config.validate().is_err());

        let mut config = with_key();
        config.classifier.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = with_key();
        config.llm.temperature = 2.5;
        assert!(config.validate().is_err());

        let mut config = with_key();
        config.llm.api_key = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unresolved_placeholder_counts_as_unset() {
        let mut config = TaskmateConfig::default();
        config.lookup.openweather_api_key = Some("${TASKMATE_TEST_SURELY_UNSET_VAR}".to_string());
        config.lookup.openweather_api_key =
            resolve_secret(config.lookup.openweather_api_key.as_ref());
        assert_eq!(config.lookup.openweather_api_key, None);
    }

    #[test]
    fn test_database_path() {
        let mut config = TaskmateConfig::default();
        let relative = config.database_path().unwrap();
        assert!(relative.ends_with(".taskmate/taskmate.db"));

        config.store.path = "/tmp/tasks.db".to_string();
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/tasks.db"));
    }

    #[test]
    fn test_redacted_hides_keys() {
        let config = with_key().redacted();
        assert_eq!(config.llm.api_key.as_deref(), Some("***"));
        assert_eq!(config.lookup.openweather_api_key, None);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let policy = ClassifierConfig::default().retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.calculate_delay(0), Duration::from_millis(2000));
        assert_eq!(policy.calculate_delay(1), Duration::from_millis(4000));
    }
}
