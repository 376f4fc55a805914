//! Real-time weather risk lookup for destination cities.
//!
//! [`WeatherProvider`] is the async seam the engine calls through;
//! [`OpenWeatherClient`] implements it against the OpenWeatherMap API and
//! [`CannedProvider`] serves a fixed offline table when no API key is
//! configured.

mod canned;
mod openweather;

pub use canned::CannedProvider;
pub use openweather::OpenWeatherClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Weather contribution to delivery risk for one city: a 0-50 sub-score plus
/// the conditions that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherRisk {
    pub risk_score: u8,
    pub reasons: Vec<String>,
}

/// Looks up current-conditions risk by city. Implementations may fail or
/// time out; the engine absorbs any error into a fixed fallback score.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn weather_risk(&self, city: &str) -> Result<WeatherRisk>;
}
