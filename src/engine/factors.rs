//! The six factor collectors.
//!
//! Each collector is a pure function of its inputs. None of them fail: a
//! missing reference row, an unreachable provider, or a malformed date all
//! resolve to the documented default for that collector, so the aggregated
//! assessment is always bounded and valid.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::shipment::Carrier;
use crate::store::{CarrierAggregate, GeoAggregate, PerformanceAggregate, TemporalPattern};

use super::types::FactorScore;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const CARRIER_RISK_CAP: u8 = 50;
pub const GEOGRAPHIC_RISK_CAP: u8 = 30;
pub const PERFORMANCE_RISK_CAP: u8 = 20;
pub const TEMPORAL_RISK_CAP: u8 = 25;

/// Defaults when no reference row exists for the key.
pub const DEFAULT_CARRIER_RISK: u8 = 25;
pub const DEFAULT_GEOGRAPHIC_RISK: u8 = 10;

/// Fixed score substituted when the weather provider fails.
pub const WEATHER_FALLBACK_RISK: u8 = 10;

/// Score for an expected-delivery date that does not parse.
pub const INVALID_DATE_TIMELINE_RISK: u8 = 5;

/// Average delay beyond which a lane's delay rate gets a severity bump.
const SEVERE_AVG_DELAY_HOURS: f64 = 8.0;

const PEAK_SEASON_MONTHS: [u32; 2] = [11, 12];

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Carrier reliability converted to risk, with a peak-season surcharge in
/// November and December. Capped at [`CARRIER_RISK_CAP`]; unknown carriers
/// score [`DEFAULT_CARRIER_RISK`].
pub fn carrier_risk(
    aggregate: Option<&CarrierAggregate>,
    carrier: Carrier,
    month: u32,
) -> FactorScore {
    let risk = match aggregate {
        Some(agg) => {
            let mut risk = 100u32.saturating_sub(u32::from(agg.reliability_score));
            if PEAK_SEASON_MONTHS.contains(&month) {
                risk += u32::from(agg.peak_season_drop);
            }
            risk.min(u32::from(CARRIER_RISK_CAP)) as u8
        }
        None => DEFAULT_CARRIER_RISK,
    };

    let mut factor = FactorScore::new(risk);
    if risk > 15 {
        factor
            .reasons
            .push(format!("{carrier} has historical delivery challenges"));
    }
    factor
}

/// Base destination risk plus a fraction of its traffic complexity. Capped
/// at [`GEOGRAPHIC_RISK_CAP`]; unknown zips score
/// [`DEFAULT_GEOGRAPHIC_RISK`].
pub fn geographic_risk(aggregate: Option<&GeoAggregate>, zip: &str) -> FactorScore {
    let risk = match aggregate {
        Some(agg) => {
            let risk =
                f64::from(agg.base_risk_score) + f64::from(agg.traffic_complexity) * 0.3;
            risk.min(f64::from(GEOGRAPHIC_RISK_CAP)) as u8
        }
        None => DEFAULT_GEOGRAPHIC_RISK,
    };

    let mut factor = FactorScore::new(risk);
    if risk > 15 {
        factor
            .reasons
            .push(format!("destination {zip} has delivery complexity"));
    }
    factor
}

/// Lane-specific delay rate for this (carrier, zip) pair, with a +5 bump
/// when the lane's average delay exceeds [`SEVERE_AVG_DELAY_HOURS`]. No
/// history means no penalty.
pub fn performance_risk(
    aggregate: Option<&PerformanceAggregate>,
    carrier: Carrier,
    zip: &str,
) -> FactorScore {
    let Some(agg) = aggregate else {
        return FactorScore::new(0);
    };
    if agg.total_deliveries == 0 {
        return FactorScore::new(0);
    }

    let delay_rate = agg.delayed_deliveries as f64 / agg.total_deliveries as f64;
    let mut risk = (delay_rate * 100.0).round() as u32;
    if agg.avg_delay_hours > SEVERE_AVG_DELAY_HOURS {
        risk += 5;
    }
    let risk = risk.min(u32::from(PERFORMANCE_RISK_CAP)) as u8;

    let mut factor = FactorScore::new(risk);
    if risk > 10 {
        factor
            .reasons
            .push(format!("{carrier} has specific issues delivering to {zip}"));
    }
    factor
}

/// The score substituted when the weather provider errors or times out.
pub fn weather_fallback() -> FactorScore {
    FactorScore::with_reason(WEATHER_FALLBACK_RISK, "weather data unavailable")
}

/// Weekday and month multipliers converted to points. A multiplier of 1.0
/// or below contributes nothing; the two contributions together are capped
/// at [`TEMPORAL_RISK_CAP`].
pub fn temporal_risk(
    day_pattern: Option<&TemporalPattern>,
    month_pattern: Option<&TemporalPattern>,
) -> FactorScore {
    let mut score = 0u32;
    let mut reasons = Vec::new();

    if let Some(pattern) = day_pattern {
        if pattern.risk_multiplier > 1.0 {
            score += ((pattern.risk_multiplier - 1.0) * 20.0) as u32;
            reasons.push(pattern.description.clone());
        }
    }

    if let Some(pattern) = month_pattern {
        if pattern.risk_multiplier > 1.0 {
            // Seasonal impact weighs heavier than weekday effects.
            score += ((pattern.risk_multiplier - 1.0) * 25.0) as u32;
            reasons.push(pattern.description.clone());
        }
    }

    FactorScore {
        score: score.min(u32::from(TEMPORAL_RISK_CAP)) as u8,
        reasons,
    }
}

/// Risk from how soon the delivery is due: same-day or overdue scores the
/// maximum, and the urgency decays to zero past a three-day horizon. A date
/// that does not parse scores [`INVALID_DATE_TIMELINE_RISK`].
pub fn timeline_risk(expected_date: &str, today: NaiveDate) -> FactorScore {
    let risk = match NaiveDate::parse_from_str(expected_date, DATE_FORMAT) {
        Ok(date) => {
            let days_until = (date - today).num_days();
            if days_until <= 0 {
                25
            } else if days_until == 1 {
                20
            } else if days_until <= 3 {
                10
            } else {
                0
            }
        }
        Err(_) => INVALID_DATE_TIMELINE_RISK,
    };

    let mut factor = FactorScore::new(risk);
    if risk > 15 {
        factor.reasons.push("tight delivery timeline".to_string());
    }
    factor
}

/// Lowercase weekday key used by the day-of-week temporal patterns.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Lowercase month key used by the month temporal patterns.
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}
