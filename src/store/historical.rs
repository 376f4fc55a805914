use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shipment::Carrier;

/// Per-carrier delivery history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierAggregate {
    pub total_deliveries: u64,
    pub on_time_deliveries: u64,
    pub delayed_deliveries: u64,
    pub average_delay_hours: f64,
    /// 0-100, higher is better.
    pub reliability_score: u8,
    /// Extra risk points during the November/December peak.
    pub peak_season_drop: u8,
}

/// Static reference data for a destination zip code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoAggregate {
    pub base_risk_score: u8,
    pub traffic_complexity: u8,
    pub weather_multiplier: f64,
}

/// Rolling per-(carrier, zip) delivery history. The only aggregate the
/// feedback loop mutates.
///
/// Invariant: `avg_delay_hours == total_delay_hours / total_deliveries`
/// after every successful upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceAggregate {
    pub total_deliveries: u64,
    pub delayed_deliveries: u64,
    pub total_delay_hours: f64,
    pub avg_delay_hours: f64,
}

/// Which calendar signal a temporal pattern keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    DayOfWeek,
    Month,
    HolidayPeriod,
}

/// Seasonal/weekday risk multiplier with a human-readable description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalPattern {
    pub risk_multiplier: f64,
    pub description: String,
}

/// Immutable record of how a shipment actually performed. Append-only.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    pub package_id: String,
    pub carrier: Carrier,
    pub origin_zip: String,
    pub destination_zip: String,
    pub scheduled_date: NaiveDate,
    pub actual_date: NaiveDate,
    pub delay_hours: f64,
    pub was_delayed: bool,
    pub delay_reasons: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store itself cannot be reached. The only store condition that
    /// propagates to callers as a hard failure.
    #[error("historical store unavailable: {0}")]
    Unavailable(String),
}

/// Durable keyed aggregates and the append-only outcome log.
///
/// Readers get `Ok(None)` for missing rows; the collectors translate that
/// into their documented default scores. `upsert_performance` must apply its
/// read-modify-write atomically per key so concurrent outcome recordings for
/// the same (carrier, zip) never lose updates.
#[async_trait]
pub trait HistoricalStore: Send + Sync {
    async fn carrier_aggregate(
        &self,
        carrier: Carrier,
    ) -> Result<Option<CarrierAggregate>, StoreError>;

    async fn geo_aggregate(&self, zip: &str) -> Result<Option<GeoAggregate>, StoreError>;

    async fn performance_aggregate(
        &self,
        carrier: Carrier,
        zip: &str,
    ) -> Result<Option<PerformanceAggregate>, StoreError>;

    async fn temporal_pattern(
        &self,
        kind: PatternKind,
        value: &str,
    ) -> Result<Option<TemporalPattern>, StoreError>;

    async fn upsert_performance(
        &self,
        carrier: Carrier,
        zip: &str,
        delayed: bool,
        delay_hours: f64,
    ) -> Result<(), StoreError>;

    async fn append_outcome(&self, outcome: DeliveryOutcome) -> Result<(), StoreError>;
}
