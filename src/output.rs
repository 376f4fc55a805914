//! Output formatting and persistence for assessments and recorded outcomes.
//!
//! Supports pretty-printed JSON logging and CSV append for the outcome log.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::shipment::Carrier;
use crate::store::DeliveryOutcome;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Flat CSV projection of a [`DeliveryOutcome`]. Delay reasons are stored as
/// a JSON array in a single column.
#[derive(Serialize)]
struct OutcomeRow<'a> {
    recorded_at: DateTime<Utc>,
    package_id: &'a str,
    carrier: Carrier,
    origin_zip: &'a str,
    destination_zip: &'a str,
    scheduled_date: NaiveDate,
    actual_date: NaiveDate,
    delay_hours: f64,
    was_delayed: bool,
    delay_reasons: String,
}

/// Appends a recorded outcome as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_outcome(path: &str, outcome: &DeliveryOutcome) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending outcome record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(OutcomeRow {
        recorded_at: outcome.recorded_at,
        package_id: &outcome.package_id,
        carrier: outcome.carrier,
        origin_zip: &outcome.origin_zip,
        destination_zip: &outcome.destination_zip,
        scheduled_date: outcome.scheduled_date,
        actual_date: outcome.actual_date,
        delay_hours: outcome.delay_hours,
        was_delayed: outcome.was_delayed,
        delay_reasons: serde_json::to_string(&outcome.delay_reasons)?,
    })?;
    writer.flush()?;

    Ok(())
}
