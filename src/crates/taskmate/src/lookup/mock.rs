//! Lookups answered from built-in data.

use super::{LookupOutcome, LookupService};
use async_trait::async_trait;

struct TwitterProfile {
    name: &'static str,
    followers: &'static str,
    tweets: &'static str,
    bio: &'static str,
}

fn twitter_profile(username: &str) -> Option<TwitterProfile> {
    match username.to_lowercase().as_str() {
        "elonmusk" => Some(TwitterProfile {
            name: "Elon Musk",
            followers: "180M",
            tweets: "25K",
            bio: "Technoking of Tesla, CEO of SpaceX",
        }),
        "jack" => Some(TwitterProfile {
            name: "Jack Dorsey",
            followers: "6M",
            tweets: "28K",
            bio: "Block Head",
        }),
        _ => None,
    }
}

/// Twitter/X profiles for a couple of well-known accounts.
pub struct TwitterLookup;

#[async_trait]
impl LookupService for TwitterLookup {
    fn name(&self) -> &'static str {
        "twitter"
    }

    async fn lookup(&self, username: &str) -> LookupOutcome {
        match twitter_profile(username) {
            Some(p) => LookupOutcome::found(format!(
                "{} (@{}) has {} followers and {} tweets. Bio: {}",
                p.name, username, p.followers, p.tweets, p.bio
            )),
            None => LookupOutcome::not_found(format!(
                "Sorry, we don't have mock data for @{}.",
                username
            )),
        }
    }
}

struct CountryFacts {
    capital: &'static str,
    population: &'static str,
    language: &'static str,
    currency: &'static str,
}

fn country_facts(country: &str) -> Option<CountryFacts> {
    match country.to_lowercase().as_str() {
        "india" => Some(CountryFacts {
            capital: "New Delhi",
            population: "1.4 billion",
            language: "Hindi & English",
            currency: "Indian Rupee (INR)",
        }),
        "japan" => Some(CountryFacts {
            capital: "Tokyo",
            population: "125 million",
            language: "Japanese",
            currency: "Japanese Yen (JPY)",
        }),
        "france" => Some(CountryFacts {
            capital: "Paris",
            population: "67 million",
            language: "French",
            currency: "Euro (EUR)",
        }),
        _ => None,
    }
}

fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Basic facts for a small set of countries.
pub struct CountryLookup;

#[async_trait]
impl LookupService for CountryLookup {
    fn name(&self) -> &'static str {
        "country"
    }

    async fn lookup(&self, country: &str) -> LookupOutcome {
        match country_facts(country) {
            Some(c) => LookupOutcome::found(format!(
                "{} - Capital: {}, Population: {}, Language: {}, Currency: {}",
                capitalize_first(country),
                c.capital,
                c.population,
                c.language,
                c.currency
            )),
            None => {
                LookupOutcome::not_found(format!("Sorry, no info available for '{}'.", country))
            }
        }
    }
}
