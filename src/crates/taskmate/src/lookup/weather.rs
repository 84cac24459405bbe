//! Current weather via the OpenWeather API (metric units).

use super::{LookupOutcome, LookupService};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

pub struct WeatherLookup {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherLookup {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    async fn fetch(&self, city: &str, api_key: &str) -> Result<WeatherResponse, reqwest::Error> {
        self.client
            .get(format!("{}/weather", self.base_url))
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await?
            .error_for_status()?
            .json::<WeatherResponse>()
            .await
    }
}

fn unavailable(city: &str) -> LookupOutcome {
    LookupOutcome::not_found(format!("Sorry, couldn't fetch weather data for {}.", city))
}

#[async_trait]
impl LookupService for WeatherLookup {
    fn name(&self) -> &'static str {
        "weather"
    }

    async fn lookup(&self, city: &str) -> LookupOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("OpenWeather API key is not configured");
            return unavailable(city);
        };

        match self.fetch(city, api_key).await {
            Ok(data) => match data.summary(city) {
                Some(summary) => LookupOutcome::found(summary),
                None => {
                    warn!(city, "Weather response had no conditions");
                    unavailable(city)
                }
            },
            Err(e) => {
                // reqwest errors carry the URL, which includes the key
                warn!(city, error = %e.without_url(), "Weather lookup failed");
                unavailable(city)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

impl WeatherResponse {
    fn summary(&self, city: &str) -> Option<String> {
        let condition = self.weather.first()?;
        Some(format!(
            "Current weather in {}: Temperature: {}°C, Condition: {}, Humidity: {}%",
            city, self.main.temp, condition.description, self.main.humidity
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_format() {
        let body = r#"{
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
            "main": {"temp": 21.5, "humidity": 40, "pressure": 1012},
            "name": "Paris"
        }"#;
        let data: WeatherResponse = serde_json::from_str(body).unwrap();

        assert_eq!(
            data.summary("Paris").unwrap(),
            "Current weather in Paris: Temperature: 21.5°C, Condition: clear sky, Humidity: 40%"
        );
    }

    #[test]
    fn test_summary_without_conditions() {
        let data: WeatherResponse =
            serde_json::from_str(r#"{"main": {"temp": 3, "humidity": 90}}"#).unwrap();
        assert!(data.summary("Oslo").is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let lookup = WeatherLookup::new(reqwest::Client::new(), "http://127.0.0.1:9", None);
        assert_eq!(
            lookup.lookup("Pune").await,
            LookupOutcome::not_found("Sorry, couldn't fetch weather data for Pune.")
        );
    }
}
