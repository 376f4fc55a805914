use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::{WeatherProvider, WeatherRisk};

/// (city, risk_score, reasons)
const CANNED_CONDITIONS: &[(&str, u8, &[&str])] = &[
    ("Seattle", 25, &["rainy conditions", "low visibility"]),
    ("New York", 10, &["partly cloudy"]),
    ("Beverly Hills", 5, &[]),
    ("Miami", 20, &["thunderstorm potential"]),
    ("Chicago", 15, &["windy conditions"]),
];

/// Risk for any city not in the canned table.
const DEFAULT_RISK: u8 = 5;

/// Offline [`WeatherProvider`] serving a fixed per-city table.
///
/// Used when no OpenWeatherMap API key is configured, and as a deterministic
/// provider in tests. Unknown cities score a mild [`DEFAULT_RISK`].
pub struct CannedProvider;

#[async_trait]
impl WeatherProvider for CannedProvider {
    async fn weather_risk(&self, city: &str) -> Result<WeatherRisk> {
        let risk = CANNED_CONDITIONS
            .iter()
            .find(|(name, _, _)| *name == city)
            .map(|&(_, risk_score, reasons)| WeatherRisk {
                risk_score,
                reasons: reasons.iter().map(|r| r.to_string()).collect(),
            })
            .unwrap_or(WeatherRisk {
                risk_score: DEFAULT_RISK,
                reasons: Vec::new(),
            });

        debug!(city, risk_score = risk.risk_score, "Canned weather served");
        Ok(risk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_city() {
        let risk = CannedProvider.weather_risk("Seattle").await.unwrap();
        assert_eq!(risk.risk_score, 25);
        assert_eq!(risk.reasons, vec!["rainy conditions", "low visibility"]);
    }

    #[tokio::test]
    async fn test_unknown_city_gets_default() {
        let risk = CannedProvider.weather_risk("Duluth").await.unwrap();
        assert_eq!(risk.risk_score, DEFAULT_RISK);
        assert!(risk.reasons.is_empty());
    }
}
