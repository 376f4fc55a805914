//! Weighted enhanced-assessment building blocks.
//!
//! The enhanced view reweights the carrier, route, weather, and performance
//! signals into a single explainable score with a confidence percentage, a
//! predicted delay, and a revised delivery date. Temporal and timeline
//! urgency are deliberately absent here: they describe when the shipment is
//! due, not how the route is likely to perform.

use chrono::{Days, NaiveDate};

use crate::shipment::Carrier;

use super::factors::DATE_FORMAT;
use super::level::factor_level;
use super::types::FactorBreakdown;

pub const WEIGHT_CARRIER: f64 = 0.30;
pub const WEIGHT_ROUTE: f64 = 0.25;
pub const WEIGHT_WEATHER: f64 = 0.25;
pub const WEIGHT_PERFORMANCE: f64 = 0.20;

/// Confidence starts here and earns bonuses for corroborating data.
const BASE_CONFIDENCE: u8 = 70;

/// Confidence never reaches 100: some uncertainty is irreducible.
pub const CONFIDENCE_CAP: u8 = 95;

/// Carriers with enough historical volume that their aggregates are trusted
/// more (USPS and UPS move the most deliveries in the reference data).
const HIGH_VOLUME_CARRIERS: [Carrier; 2] = [Carrier::Usps, Carrier::Ups];

/// Routing complexity proxy from the destination zip's numeric prefix.
///
/// West-coast zips sit far from the eastern distribution hubs, the deep
/// northeast is dense but close, and anything outside the known bands is
/// scored as the worst case.
pub fn route_distance_risk(zip: &str) -> u8 {
    let prefix: String = zip.chars().take_while(|c| c.is_ascii_digit()).collect();
    let Ok(number) = prefix.parse::<u32>() else {
        return 70;
    };

    match number {
        90000..=99999 => 65,
        0..=19999 => 35,
        60000..=69999 => 45,
        30000..=39999 => 55,
        _ => 70,
    }
}

/// Fixed-weight combination of the four enhanced factors, floored and
/// capped to the 0-100 range.
pub fn weighted_score(carrier: u8, route: u8, weather: u8, performance: u8) -> u8 {
    let score = f64::from(carrier) * WEIGHT_CARRIER
        + f64::from(route) * WEIGHT_ROUTE
        + f64::from(weather) * WEIGHT_WEATHER
        + f64::from(performance) * WEIGHT_PERFORMANCE;

    (score.floor() as u32).min(100) as u8
}

/// How much to trust the assessment, as a percentage.
///
/// Live weather data, an existing lane history, and a high-volume carrier
/// each add confidence on top of [`BASE_CONFIDENCE`], capped at
/// [`CONFIDENCE_CAP`].
pub fn confidence_level(
    weather_fetched: bool,
    performance_known: bool,
    carrier: Carrier,
) -> u8 {
    let mut confidence = BASE_CONFIDENCE;
    if weather_fetched {
        confidence += 10;
    }
    if performance_known {
        confidence += 15;
    }
    if HIGH_VOLUME_CARRIERS.contains(&carrier) {
        confidence += 5;
    }
    confidence.min(CONFIDENCE_CAP)
}

/// Expected slip in whole days for a given overall score.
pub fn predicted_delay_days(score: u8) -> u8 {
    match score {
        s if s >= 80 => 2,
        s if s >= 50 => 1,
        _ => 0,
    }
}

/// Resolves the original delivery date and shifts it by the predicted
/// delay. A date that does not parse falls back to `today` rather than
/// failing the assessment.
pub fn revised_delivery_date(
    expected_date: &str,
    delay_days: u8,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let original =
        NaiveDate::parse_from_str(expected_date, DATE_FORMAT).unwrap_or(today);
    let revised = original
        .checked_add_days(Days::new(u64::from(delay_days)))
        .unwrap_or(original);
    (original, revised)
}

/// Builds one factor's breakdown entry: the risky status text is used once
/// the sub-score crosses the midpoint, and the level bands follow
/// [`factor_level`].
pub fn factor_breakdown(
    score: u8,
    weight_percent: u8,
    risky_status: &str,
    normal_status: &str,
) -> FactorBreakdown {
    FactorBreakdown {
        score,
        weight_percent,
        status: if score >= 50 { risky_status } else { normal_status }.to_string(),
        level: factor_level(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::FactorLevel;

    #[test]
    fn test_route_bands() {
        assert_eq!(route_distance_risk("98101"), 65); // Seattle
        assert_eq!(route_distance_risk("90210"), 65); // Beverly Hills
        assert_eq!(route_distance_risk("10001"), 35); // New York
        assert_eq!(route_distance_risk("60601"), 45); // Chicago
        assert_eq!(route_distance_risk("33101"), 55); // Miami
        assert_eq!(route_distance_risk("45201"), 70); // off-band
    }

    #[test]
    fn test_route_band_uses_numeric_prefix() {
        assert_eq!(route_distance_risk("98101-1234"), 65);
    }

    #[test]
    fn test_route_band_unparsable_zip_is_worst_case() {
        assert_eq!(route_distance_risk("ABCDE"), 70);
        assert_eq!(route_distance_risk(""), 70);
    }

    #[test]
    fn test_weighted_score_floors() {
        // 47 * 0.30 + 65 * 0.25 + 25 * 0.25 + 18 * 0.20 = 40.2 -> 40.
        assert_eq!(weighted_score(47, 65, 25, 18), 40);
    }

    #[test]
    fn test_weighted_score_zero_inputs() {
        assert_eq!(weighted_score(0, 0, 0, 0), 0);
    }

    #[test]
    fn test_confidence_bonuses_accumulate_and_cap() {
        assert_eq!(confidence_level(false, false, Carrier::Dhl), 70);
        assert_eq!(confidence_level(true, false, Carrier::Dhl), 80);
        assert_eq!(confidence_level(false, true, Carrier::Dhl), 85);
        assert_eq!(confidence_level(true, true, Carrier::FedEx), 95);
        // All three bonuses would reach 100; the cap keeps it at 95.
        assert_eq!(confidence_level(true, true, Carrier::Usps), CONFIDENCE_CAP);
        assert_eq!(confidence_level(true, true, Carrier::Ups), CONFIDENCE_CAP);
    }

    #[test]
    fn test_predicted_delay_bands() {
        assert_eq!(predicted_delay_days(85), 2);
        assert_eq!(predicted_delay_days(80), 2);
        assert_eq!(predicted_delay_days(60), 1);
        assert_eq!(predicted_delay_days(50), 1);
        assert_eq!(predicted_delay_days(30), 0);
        assert_eq!(predicted_delay_days(0), 0);
    }

    #[test]
    fn test_revised_date_shifts_by_delay() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let (original, revised) = revised_delivery_date("2025-06-20", 2, today);

        assert_eq!(original, NaiveDate::from_ymd_opt(2025, 6, 20).unwrap());
        assert_eq!(revised, NaiveDate::from_ymd_opt(2025, 6, 22).unwrap());
    }

    #[test]
    fn test_revised_date_unparsable_falls_back_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let (original, revised) = revised_delivery_date("soon", 1, today);

        assert_eq!(original, today);
        assert_eq!(revised, NaiveDate::from_ymd_opt(2025, 6, 11).unwrap());
    }

    #[test]
    fn test_factor_breakdown_status_and_level() {
        let risky = factor_breakdown(65, 25, "long haul", "routine");
        assert_eq!(risky.status, "long haul");
        assert_eq!(risky.level, FactorLevel::Medium);
        assert_eq!(risky.weight_percent, 25);

        let calm = factor_breakdown(12, 30, "long haul", "routine");
        assert_eq!(calm.status, "routine");
        assert_eq!(calm.level, FactorLevel::Low);

        let severe = factor_breakdown(85, 25, "long haul", "routine");
        assert_eq!(severe.level, FactorLevel::High);
    }
}
