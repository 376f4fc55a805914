//! Data types produced by the risk engine.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One bounded contribution to an overall risk score, with the reasons it
/// triggered. Recomputed per request, never persisted.
#[derive(Debug, Clone, Default)]
pub struct FactorScore {
    pub score: u8,
    pub reasons: Vec<String>,
}

impl FactorScore {
    pub fn new(score: u8) -> Self {
        Self {
            score,
            reasons: Vec::new(),
        }
    }

    pub fn with_reason(score: u8, reason: impl Into<String>) -> Self {
        Self {
            score,
            reasons: vec![reason.into()],
        }
    }
}

/// Additive risk result: capped sum of all six collectors plus their
/// triggered reasons, in collector order.
#[derive(Debug, Clone, Serialize)]
pub struct BasicAssessment {
    pub risk_score: u8,
    pub reasons: Vec<String>,
}

/// Severity band for one factor in the enhanced breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorLevel {
    Low,
    Medium,
    High,
}

/// One named factor in the enhanced breakdown: its sub-score, the fixed
/// weight it carries in the overall score, and a human-readable status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorBreakdown {
    pub score: u8,
    pub weight_percent: u8,
    pub status: String,
    pub level: FactorLevel,
}

/// Weighted, explainable risk result with confidence and predicted delay.
///
/// Factors are kept in a `BTreeMap` so serialized output is byte-stable,
/// which the result cache's repeat-read guarantee depends on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedAssessment {
    pub score: u8,
    pub confidence_level: u8,
    pub predicted_delay_days: u8,
    pub factors: BTreeMap<String, FactorBreakdown>,
    pub original_delivery_date: NaiveDate,
    pub revised_delivery_date: NaiveDate,
}
