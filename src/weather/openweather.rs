use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tracing::debug;

use super::{WeatherProvider, WeatherRisk};

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Weather risk is capped below the other collectors' combined weight.
const WEATHER_RISK_CAP: u8 = 50;

/// Wind above this speed (m/s) adds risk regardless of conditions.
const HIGH_WIND_SPEED: f64 = 10.0;

/// OpenWeatherMap current-conditions client.
///
/// Results are memoized per city for the lifetime of the client, so a batch
/// of shipments to the same destination costs one API call.
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    cache: DashMap<String, WeatherRisk>,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            api_key,
            base_url: BASE_URL.to_string(),
            client,
            cache: DashMap::new(),
        })
    }

    #[cfg(test)]
    fn with_base_url(api_key: String, base_url: String) -> Result<Self> {
        let mut provider = Self::new(api_key)?;
        provider.base_url = base_url;
        Ok(provider)
    }

    /// Scores a raw API response body.
    ///
    /// Thunderstorm and snow are treated as severe (+30), rain and drizzle as
    /// wet (+15), fog and mist as visibility hazards (+10), and winds above
    /// [`HIGH_WIND_SPEED`] add +10 on top of any condition.
    fn score_conditions(body: &serde_json::Value) -> WeatherRisk {
        let mut risk_score: u8 = 0;
        let mut reasons = Vec::new();

        if let Some(main) = body["weather"][0]["main"].as_str() {
            let condition = main.to_ascii_lowercase();
            match condition.as_str() {
                "thunderstorm" | "snow" => {
                    risk_score += 30;
                    reasons.push(format!("severe weather: {condition}"));
                }
                "rain" | "drizzle" => {
                    risk_score += 15;
                    reasons.push(format!("wet weather: {condition}"));
                }
                "fog" | "mist" => {
                    risk_score += 10;
                    reasons.push("low visibility conditions".to_string());
                }
                _ => {}
            }
        }

        let wind_speed = body["wind"]["speed"].as_f64().unwrap_or(0.0);
        if wind_speed > HIGH_WIND_SPEED {
            risk_score += 10;
            reasons.push("high winds".to_string());
        }

        WeatherRisk {
            risk_score: risk_score.min(WEATHER_RISK_CAP),
            reasons,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn weather_risk(&self, city: &str) -> Result<WeatherRisk> {
        if let Some(hit) = self.cache.get(city) {
            debug!(city, "Weather cache hit");
            return Ok(hit.value().clone());
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reach weather API: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Weather API returned status {}: {}",
                status,
                body
            ));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse weather response: {}", e))?;

        let risk = Self::score_conditions(&body);
        debug!(
            city,
            risk_score = risk.risk_score,
            "Weather conditions scored"
        );

        self.cache.insert(city.to_string(), risk.clone());
        Ok(risk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_score_severe_conditions() {
        let body = json!({
            "weather": [{"main": "Thunderstorm", "description": "heavy storm"}],
            "wind": {"speed": 4.2}
        });

        let risk = OpenWeatherClient::score_conditions(&body);
        assert_eq!(risk.risk_score, 30);
        assert_eq!(risk.reasons, vec!["severe weather: thunderstorm"]);
    }

    #[test]
    fn test_score_snow_with_high_winds() {
        let body = json!({
            "weather": [{"main": "Snow"}],
            "wind": {"speed": 12.0}
        });

        let risk = OpenWeatherClient::score_conditions(&body);
        assert_eq!(risk.risk_score, 40);
        assert_eq!(
            risk.reasons,
            vec!["severe weather: snow", "high winds"]
        );
    }

    #[test]
    fn test_score_wet_conditions() {
        let body = json!({"weather": [{"main": "Drizzle"}]});

        let risk = OpenWeatherClient::score_conditions(&body);
        assert_eq!(risk.risk_score, 15);
        assert_eq!(risk.reasons, vec!["wet weather: drizzle"]);
    }

    #[test]
    fn test_score_low_visibility() {
        let body = json!({"weather": [{"main": "Fog"}]});

        let risk = OpenWeatherClient::score_conditions(&body);
        assert_eq!(risk.risk_score, 10);
        assert_eq!(risk.reasons, vec!["low visibility conditions"]);
    }

    #[test]
    fn test_score_clear_sky_is_zero() {
        let body = json!({
            "weather": [{"main": "Clear"}],
            "wind": {"speed": 3.0}
        });

        let risk = OpenWeatherClient::score_conditions(&body);
        assert_eq!(risk.risk_score, 0);
        assert!(risk.reasons.is_empty());
    }

    #[test]
    fn test_score_missing_fields_is_zero() {
        let risk = OpenWeatherClient::score_conditions(&json!({}));
        assert_eq!(risk.risk_score, 0);
        assert!(risk.reasons.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let provider = OpenWeatherClient::with_base_url(
            "test-key".to_string(),
            // Reserved TEST-NET-1 address, nothing listens there.
            "http://192.0.2.1:9/weather".to_string(),
        )
        .unwrap();

        assert!(provider.weather_risk("Seattle").await.is_err());
    }
}
