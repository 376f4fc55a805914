use chrono::{Datelike, NaiveDate, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::shipment::{Carrier, Shipment};
use crate::store::{DeliveryOutcome, HistoricalStore, PatternKind, StoreError};
use crate::weather::WeatherProvider;

use super::cache::{AssessmentCache, CacheKey};
use super::enhanced;
use super::factors;
use super::types::{BasicAssessment, EnhancedAssessment, FactorScore};

/// A delivery counts as delayed once it lands more than a day late.
const DELAYED_THRESHOLD_HOURS: f64 = 24.0;

/// Status text pairs for the enhanced breakdown: (at or above the midpoint,
/// below it).
const CARRIER_STATUS: (&str, &str) = (
    "carrier showing delivery delays",
    "carrier operating normally",
);
const ROUTE_STATUS: (&str, &str) = ("long-haul route complexity", "routine route distance");
const WEATHER_STATUS: (&str, &str) = ("adverse weather on route", "clear conditions expected");
const PERFORMANCE_STATUS: (&str, &str) = ("lane has a history of delays", "lane performing well");

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The historical store could not be reached. The only failure a scoring
    /// request surfaces; everything else degrades to documented defaults.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An outcome recording carried a date the recorder cannot work with.
    #[error("invalid {field} date: {value:?}")]
    InvalidDate { field: &'static str, value: String },
}

/// The risk scoring and adaptive learning engine.
///
/// Construction injects everything the engine touches: the historical store
/// it reads, the weather provider it queries, and the assessment cache it
/// memoizes into. Scoring never fails for lack of data; only an unreachable
/// store propagates as an error.
pub struct RiskEngine<S, W> {
    store: S,
    weather: W,
    cache: AssessmentCache,
}

impl<S: HistoricalStore, W: WeatherProvider> RiskEngine<S, W> {
    pub fn new(store: S, weather: W) -> Self {
        Self::with_cache(store, weather, AssessmentCache::new())
    }

    pub fn with_cache(store: S, weather: W, cache: AssessmentCache) -> Self {
        Self {
            store,
            weather,
            cache,
        }
    }

    /// The injected historical store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Additive six-factor risk score for a shipment, as of today.
    pub async fn basic_assessment(
        &self,
        shipment: &Shipment,
    ) -> Result<BasicAssessment, EngineError> {
        self.basic_assessment_at(shipment, Utc::now().date_naive())
            .await
    }

    /// Additive six-factor risk score evaluated against a given calendar
    /// day. Peak-season and timeline urgency are relative to `today`.
    pub async fn basic_assessment_at(
        &self,
        shipment: &Shipment,
        today: NaiveDate,
    ) -> Result<BasicAssessment, EngineError> {
        debug!(
            package_id = %shipment.package_id,
            carrier = %shipment.carrier,
            zip = %shipment.destination_zip,
            city = %shipment.destination_city,
            "Scoring shipment"
        );

        let carrier_agg = self.store.carrier_aggregate(shipment.carrier).await?;
        let carrier =
            factors::carrier_risk(carrier_agg.as_ref(), shipment.carrier, today.month());
        debug!(score = carrier.score, "Carrier factor");

        let geo_agg = self.store.geo_aggregate(&shipment.destination_zip).await?;
        let geographic = factors::geographic_risk(geo_agg.as_ref(), &shipment.destination_zip);
        debug!(score = geographic.score, "Geographic factor");

        let perf_agg = self
            .store
            .performance_aggregate(shipment.carrier, &shipment.destination_zip)
            .await?;
        let performance = factors::performance_risk(
            perf_agg.as_ref(),
            shipment.carrier,
            &shipment.destination_zip,
        );
        debug!(score = performance.score, "Performance factor");

        let (weather, _) = self.weather_factor(&shipment.destination_city).await;
        debug!(score = weather.score, "Weather factor");

        let temporal = self
            .temporal_factor(&shipment.expected_delivery_date)
            .await?;
        debug!(score = temporal.score, "Temporal factor");

        let timeline = factors::timeline_risk(&shipment.expected_delivery_date, today);
        debug!(score = timeline.score, "Timeline factor");

        let collected = [carrier, geographic, performance, weather, temporal, timeline];
        let total: u32 = collected.iter().map(|f| u32::from(f.score)).sum();
        let risk_score = total.min(100) as u8;

        let mut reasons: Vec<String> = collected.into_iter().flat_map(|f| f.reasons).collect();
        if reasons.is_empty() {
            reasons.push("low risk delivery".to_string());
        }

        info!(
            package_id = %shipment.package_id,
            risk_score,
            uncapped = total,
            "Basic assessment complete"
        );

        Ok(BasicAssessment {
            risk_score,
            reasons,
        })
    }

    /// Weighted, cache-aware assessment with confidence and predicted
    /// delay. Repeat requests for the same (package, delivery date) within
    /// the cache TTL return the memoized result unchanged.
    pub async fn enhanced_assessment(
        &self,
        shipment: &Shipment,
    ) -> Result<EnhancedAssessment, EngineError> {
        self.enhanced_assessment_at(shipment, Utc::now().date_naive())
            .await
    }

    /// Cache-aware enhanced assessment evaluated against a given calendar
    /// day.
    pub async fn enhanced_assessment_at(
        &self,
        shipment: &Shipment,
        today: NaiveDate,
    ) -> Result<EnhancedAssessment, EngineError> {
        let key = CacheKey {
            package_id: shipment.package_id.clone(),
            expected_delivery_date: shipment.expected_delivery_date.clone(),
        };

        if let Some(hit) = self.cache.get(&key) {
            debug!(package_id = %shipment.package_id, "Assessment cache hit");
            return Ok(hit);
        }

        let assessment = self.build_enhanced(shipment, today).await?;
        self.cache.insert(key, assessment.clone());
        Ok(assessment)
    }

    async fn build_enhanced(
        &self,
        shipment: &Shipment,
        today: NaiveDate,
    ) -> Result<EnhancedAssessment, EngineError> {
        let carrier_agg = self.store.carrier_aggregate(shipment.carrier).await?;
        let carrier =
            factors::carrier_risk(carrier_agg.as_ref(), shipment.carrier, today.month());

        let perf_agg = self
            .store
            .performance_aggregate(shipment.carrier, &shipment.destination_zip)
            .await?;
        let performance_known = perf_agg.is_some();
        let performance = factors::performance_risk(
            perf_agg.as_ref(),
            shipment.carrier,
            &shipment.destination_zip,
        );

        let (weather, weather_fetched) = self.weather_factor(&shipment.destination_city).await;

        let route = enhanced::route_distance_risk(&shipment.destination_zip);

        let score =
            enhanced::weighted_score(carrier.score, route, weather.score, performance.score);
        let confidence_level =
            enhanced::confidence_level(weather_fetched, performance_known, shipment.carrier);
        let predicted_delay_days = enhanced::predicted_delay_days(score);
        let (original_delivery_date, revised_delivery_date) = enhanced::revised_delivery_date(
            &shipment.expected_delivery_date,
            predicted_delay_days,
            today,
        );

        let mut breakdown = BTreeMap::new();
        breakdown.insert(
            "carrier".to_string(),
            enhanced::factor_breakdown(carrier.score, 30, CARRIER_STATUS.0, CARRIER_STATUS.1),
        );
        breakdown.insert(
            "route".to_string(),
            enhanced::factor_breakdown(route, 25, ROUTE_STATUS.0, ROUTE_STATUS.1),
        );
        breakdown.insert(
            "weather".to_string(),
            enhanced::factor_breakdown(weather.score, 25, WEATHER_STATUS.0, WEATHER_STATUS.1),
        );
        breakdown.insert(
            "performance".to_string(),
            enhanced::factor_breakdown(
                performance.score,
                20,
                PERFORMANCE_STATUS.0,
                PERFORMANCE_STATUS.1,
            ),
        );

        info!(
            package_id = %shipment.package_id,
            score,
            confidence_level,
            predicted_delay_days,
            "Enhanced assessment built"
        );

        Ok(EnhancedAssessment {
            score,
            confidence_level,
            predicted_delay_days,
            factors: breakdown,
            original_delivery_date,
            revised_delivery_date,
        })
    }

    /// Records an observed delivery outcome and folds it into the
    /// (carrier, destination zip) performance aggregate that future scores
    /// read. Returns the appended outcome row.
    pub async fn record_outcome(
        &self,
        package_id: &str,
        carrier: Carrier,
        origin_zip: &str,
        destination_zip: &str,
        scheduled_date: &str,
        actual_date: &str,
        delay_reasons: Vec<String>,
    ) -> Result<DeliveryOutcome, EngineError> {
        let scheduled = NaiveDate::parse_from_str(scheduled_date, factors::DATE_FORMAT)
            .map_err(|_| EngineError::InvalidDate {
                field: "scheduled",
                value: scheduled_date.to_string(),
            })?;
        let actual = NaiveDate::parse_from_str(actual_date, factors::DATE_FORMAT).map_err(
            |_| EngineError::InvalidDate {
                field: "actual",
                value: actual_date.to_string(),
            },
        )?;

        let delay_hours = (actual - scheduled).num_hours() as f64;
        let was_delayed = delay_hours > DELAYED_THRESHOLD_HOURS;

        let outcome = DeliveryOutcome {
            package_id: package_id.to_string(),
            carrier,
            origin_zip: origin_zip.to_string(),
            destination_zip: destination_zip.to_string(),
            scheduled_date: scheduled,
            actual_date: actual,
            delay_hours,
            was_delayed,
            delay_reasons,
            recorded_at: Utc::now(),
        };

        self.store.append_outcome(outcome.clone()).await?;
        self.store
            .upsert_performance(carrier, destination_zip, was_delayed, delay_hours)
            .await?;

        info!(
            package_id,
            carrier = %carrier,
            destination_zip,
            delay_hours,
            was_delayed,
            "Delivery outcome recorded"
        );

        Ok(outcome)
    }

    /// Weather sub-score plus whether it came from a live lookup. Provider
    /// failures degrade to the fixed fallback instead of failing the
    /// request.
    async fn weather_factor(&self, city: &str) -> (FactorScore, bool) {
        match self.weather.weather_risk(city).await {
            Ok(risk) => (
                FactorScore {
                    score: risk.risk_score.min(50),
                    reasons: risk.reasons,
                },
                true,
            ),
            Err(error) => {
                warn!(city, %error, "Weather provider failed, using fallback");
                (factors::weather_fallback(), false)
            }
        }
    }

    async fn temporal_factor(&self, expected_date: &str) -> Result<FactorScore, EngineError> {
        let Ok(date) = NaiveDate::parse_from_str(expected_date, factors::DATE_FORMAT) else {
            return Ok(FactorScore::new(0));
        };

        let day_pattern = self
            .store
            .temporal_pattern(PatternKind::DayOfWeek, factors::weekday_name(date))
            .await?;
        let month_pattern = self
            .store
            .temporal_pattern(PatternKind::Month, factors::month_name(date))
            .await?;

        Ok(factors::temporal_risk(
            day_pattern.as_ref(),
            month_pattern.as_ref(),
        ))
    }
}
