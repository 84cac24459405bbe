//! GitHub public profile summary.

use super::{LookupOutcome, LookupService};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

pub struct GithubLookup {
    client: reqwest::Client,
    base_url: String,
}

impl GithubLookup {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, username: &str) -> Result<GithubUser, reqwest::Error> {
        self.client
            .get(format!("{}/users/{}", self.base_url, username))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json::<GithubUser>()
            .await
    }
}

#[async_trait]
impl LookupService for GithubLookup {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn lookup(&self, username: &str) -> LookupOutcome {
        let valid = !username.is_empty()
            && username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return LookupOutcome::not_found(format!(
                "Sorry, couldn't fetch GitHub data for {}.",
                username
            ));
        }

        match self.fetch(username).await {
            Ok(user) => LookupOutcome::found(user.summary()),
            Err(e) => {
                warn!(username, error = %e, "GitHub lookup failed");
                LookupOutcome::not_found(format!(
                    "Sorry, couldn't fetch GitHub data for {}.",
                    username
                ))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
    name: Option<String>,
    bio: Option<String>,
    #[serde(default)]
    public_repos: u64,
    #[serde(default)]
    followers: u64,
}

impl GithubUser {
    fn summary(&self) -> String {
        let name = self.name.as_deref().unwrap_or(&self.login);
        let bio = self
            .bio
            .as_deref()
            .map(str::trim)
            .filter(|bio| !bio.is_empty())
            .unwrap_or("No bio");

        format!(
            "{} (@{}) has {} public repos and {} followers. Bio: {}.",
            name, self.login, self.public_repos, self.followers, bio
        )
    }
}
