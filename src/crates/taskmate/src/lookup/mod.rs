//! External lookup collaborators
//!
//! Each lookup turns a single key (city, username, country) into a one-line
//! summary. Lookups never fail past this boundary: network errors, missing
//! credentials and unknown keys all become [`LookupOutcome::NotFound`] with a
//! user-facing reason, and the technical detail is logged.

pub mod github;
pub mod mock;
pub mod weather;

pub use github::GithubLookup;
pub use mock::{CountryLookup, TwitterLookup};
pub use weather::WeatherLookup;

use crate::config::LookupConfig;
use crate::error::{Result, TaskmateError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Result of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found { summary: String },
    NotFound { reason: String },
}

impl LookupOutcome {
    pub fn found(summary: impl Into<String>) -> Self {
        LookupOutcome::Found {
            summary: summary.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        LookupOutcome::NotFound {
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait LookupService: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, key: &str) -> LookupOutcome;
}

/// The lookup services bound into the tool registry.
#[derive(Clone)]
pub struct Lookups {
    pub weather: Arc<dyn LookupService>,
    pub github: Arc<dyn LookupService>,
    pub twitter: Arc<dyn LookupService>,
    pub country: Arc<dyn LookupService>,
}

impl Lookups {
    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        let client = http_client(Duration::from_secs(config.timeout_secs))?;

        Ok(Self {
            weather: Arc::new(WeatherLookup::new(
                client.clone(),
                config.openweather_base.clone(),
                config.openweather_api_key.clone(),
            )),
            github: Arc::new(GithubLookup::new(client, config.github_base.clone())),
            twitter: Arc::new(TwitterLookup),
            country: Arc::new(CountryLookup),
        })
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("taskmate/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TaskmateError::Lookup(format!("Failed to create HTTP client: {}", e)))
}
