//! Risk scoring and adaptive learning.
//!
//! This module turns a [`crate::shipment::Shipment`] into a bounded risk
//! assessment: six factor collectors read the historical store and the
//! weather provider, an aggregator sums them into a basic 0-100 score, and
//! the enhanced builder reweights a subset into an explainable breakdown
//! with confidence and a revised delivery date. Recorded delivery outcomes
//! feed back into the (carrier, zip) performance aggregate that future
//! scores read.

pub mod cache;
pub mod enhanced;
pub mod factors;
pub mod level;
pub mod scorer;
pub mod types;

pub use scorer::{EngineError, RiskEngine};
