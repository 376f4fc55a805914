use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::shipment::Carrier;

use super::historical::{
    CarrierAggregate, DeliveryOutcome, GeoAggregate, HistoricalStore, PatternKind,
    PerformanceAggregate, StoreError, TemporalPattern,
};

/// Seed rows mirroring several years of industry-average carrier history.
/// (carrier, total, on_time, delayed, avg_delay_hours, reliability, peak_drop)
const CARRIER_SEED: &[(Carrier, u64, u64, u64, f64, u8, u8)] = &[
    (Carrier::Ups, 1_000_000, 920_000, 80_000, 6.2, 85, 15),
    (Carrier::FedEx, 800_000, 760_000, 40_000, 4.8, 88, 12),
    (Carrier::Usps, 1_200_000, 1_020_000, 180_000, 8.1, 78, 25),
    (Carrier::Dhl, 300_000, 276_000, 24_000, 5.5, 82, 18),
];

/// (zip, base_risk, weather_multiplier, traffic_complexity)
const GEO_SEED: &[(&str, u8, f64, u8)] = &[
    ("98101", 15, 1.3, 25),
    ("10001", 20, 1.1, 35),
    ("90210", 8, 0.9, 15),
    ("33101", 25, 1.5, 20),
    ("60601", 18, 1.2, 30),
];

const TEMPORAL_SEED: &[(PatternKind, &str, f64, &str)] = &[
    (
        PatternKind::DayOfWeek,
        "monday",
        1.1,
        "Monday packages often delayed due to weekend backlog",
    ),
    (PatternKind::DayOfWeek, "friday", 1.05, "End of week rush"),
    (PatternKind::Month, "december", 1.4, "Holiday season rush"),
    (
        PatternKind::Month,
        "november",
        1.2,
        "Black Friday and Thanksgiving impact",
    ),
    (
        PatternKind::HolidayPeriod,
        "christmas_week",
        1.6,
        "Week of Christmas",
    ),
    (
        PatternKind::HolidayPeriod,
        "thanksgiving_week",
        1.3,
        "Thanksgiving week",
    ),
];

/// (carrier, zip, total, delayed, avg_delay_hours)
const PERFORMANCE_SEED: &[(Carrier, &str, u64, u64, f64)] = &[
    (Carrier::Ups, "98101", 3200, 288, 5.2),
    (Carrier::Ups, "10001", 4100, 697, 7.5),
    (Carrier::Ups, "90210", 2600, 182, 4.1),
    (Carrier::Ups, "33101", 2900, 551, 8.3),
    (Carrier::Ups, "60601", 3600, 432, 6.0),
    (Carrier::FedEx, "98101", 2800, 168, 4.0),
    (Carrier::FedEx, "10001", 3500, 420, 5.6),
    (Carrier::FedEx, "90210", 2200, 132, 3.4),
    (Carrier::FedEx, "33101", 2400, 360, 6.8),
    (Carrier::FedEx, "60601", 3100, 279, 4.9),
    (Carrier::Usps, "98101", 4800, 864, 8.9),
    (Carrier::Usps, "10001", 5000, 1150, 10.4),
    (Carrier::Usps, "90210", 3900, 468, 6.2),
    (Carrier::Usps, "33101", 4200, 966, 11.7),
    (Carrier::Usps, "60601", 4600, 874, 9.5),
    (Carrier::Dhl, "98101", 1400, 112, 4.6),
    (Carrier::Dhl, "10001", 1800, 270, 6.3),
    (Carrier::Dhl, "90210", 1100, 77, 3.8),
    (Carrier::Dhl, "33101", 1300, 234, 9.1),
    (Carrier::Dhl, "60601", 1600, 208, 5.7),
];

/// In-memory [`HistoricalStore`] backed by sharded concurrent maps.
///
/// The performance upsert runs under the dashmap entry lock for its key, so
/// the read-modify-write is atomic per (carrier, zip) and independent keys
/// never contend on each other.
pub struct MemoryStore {
    carriers: DashMap<Carrier, CarrierAggregate>,
    geography: DashMap<String, GeoAggregate>,
    performance: DashMap<(Carrier, String), PerformanceAggregate>,
    temporal: DashMap<(PatternKind, String), TemporalPattern>,
    outcomes: Mutex<Vec<DeliveryOutcome>>,
}

impl MemoryStore {
    /// An empty store. Every lookup returns `None` until data is written.
    pub fn new() -> Self {
        Self {
            carriers: DashMap::new(),
            geography: DashMap::new(),
            performance: DashMap::new(),
            temporal: DashMap::new(),
            outcomes: Mutex::new(Vec::new()),
        }
    }

    /// A store pre-loaded with the reference data set: four carriers, five
    /// destination zips, the weekday/month/holiday patterns, and a
    /// performance row for each carrier x zip pair.
    pub fn seeded() -> Self {
        let store = Self::new();

        for &(carrier, total, on_time, delayed, avg_delay, reliability, peak_drop) in CARRIER_SEED {
            store.carriers.insert(
                carrier,
                CarrierAggregate {
                    total_deliveries: total,
                    on_time_deliveries: on_time,
                    delayed_deliveries: delayed,
                    average_delay_hours: avg_delay,
                    reliability_score: reliability,
                    peak_season_drop: peak_drop,
                },
            );
        }

        for &(zip, base_risk, weather_multiplier, traffic) in GEO_SEED {
            store.geography.insert(
                zip.to_string(),
                GeoAggregate {
                    base_risk_score: base_risk,
                    traffic_complexity: traffic,
                    weather_multiplier,
                },
            );
        }

        for &(kind, value, multiplier, description) in TEMPORAL_SEED {
            store.temporal.insert(
                (kind, value.to_string()),
                TemporalPattern {
                    risk_multiplier: multiplier,
                    description: description.to_string(),
                },
            );
        }

        for &(carrier, zip, total, delayed, avg_delay) in PERFORMANCE_SEED {
            store.performance.insert(
                (carrier, zip.to_string()),
                PerformanceAggregate {
                    total_deliveries: total,
                    delayed_deliveries: delayed,
                    total_delay_hours: avg_delay * total as f64,
                    avg_delay_hours: avg_delay,
                },
            );
        }

        debug!(
            carriers = store.carriers.len(),
            zips = store.geography.len(),
            pairs = store.performance.len(),
            patterns = store.temporal.len(),
            "Memory store seeded"
        );

        store
    }

    /// Snapshot of the append-only outcome log, oldest first.
    pub fn outcome_log(&self) -> Vec<DeliveryOutcome> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoricalStore for MemoryStore {
    async fn carrier_aggregate(
        &self,
        carrier: Carrier,
    ) -> Result<Option<CarrierAggregate>, StoreError> {
        Ok(self.carriers.get(&carrier).map(|r| r.value().clone()))
    }

    async fn geo_aggregate(&self, zip: &str) -> Result<Option<GeoAggregate>, StoreError> {
        Ok(self.geography.get(zip).map(|r| r.value().clone()))
    }

    async fn performance_aggregate(
        &self,
        carrier: Carrier,
        zip: &str,
    ) -> Result<Option<PerformanceAggregate>, StoreError> {
        Ok(self
            .performance
            .get(&(carrier, zip.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn temporal_pattern(
        &self,
        kind: PatternKind,
        value: &str,
    ) -> Result<Option<TemporalPattern>, StoreError> {
        Ok(self
            .temporal
            .get(&(kind, value.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn upsert_performance(
        &self,
        carrier: Carrier,
        zip: &str,
        delayed: bool,
        delay_hours: f64,
    ) -> Result<(), StoreError> {
        // The entry guard holds the shard lock across the whole
        // read-modify-write, which is what makes the upsert atomic per key.
        self.performance
            .entry((carrier, zip.to_string()))
            .and_modify(|agg| {
                agg.total_deliveries += 1;
                agg.delayed_deliveries += u64::from(delayed);
                agg.total_delay_hours += delay_hours;
                agg.avg_delay_hours = agg.total_delay_hours / agg.total_deliveries as f64;
            })
            .or_insert_with(|| PerformanceAggregate {
                total_deliveries: 1,
                delayed_deliveries: u64::from(delayed),
                total_delay_hours: delay_hours,
                avg_delay_hours: delay_hours,
            });

        Ok(())
    }

    async fn append_outcome(&self, outcome: DeliveryOutcome) -> Result<(), StoreError> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome);
        Ok(())
    }
}
