use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of carriers this engine scores.
///
/// Unknown carriers are a parse-time error at the edge; inside the engine a
/// missing historical row for a known carrier falls back to a default risk
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Carrier {
    #[serde(rename = "UPS")]
    Ups,
    #[serde(rename = "FedEx")]
    FedEx,
    #[serde(rename = "USPS")]
    Usps,
    #[serde(rename = "DHL")]
    Dhl,
}

impl Carrier {
    pub const ALL: [Carrier; 4] = [Carrier::Ups, Carrier::FedEx, Carrier::Usps, Carrier::Dhl];

    pub fn as_str(&self) -> &'static str {
        match self {
            Carrier::Ups => "UPS",
            Carrier::FedEx => "FedEx",
            Carrier::Usps => "USPS",
            Carrier::Dhl => "DHL",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown carrier: {0}")]
pub struct UnknownCarrier(String);

impl FromStr for Carrier {
    type Err = UnknownCarrier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ups" => Ok(Carrier::Ups),
            "fedex" => Ok(Carrier::FedEx),
            "usps" => Ok(Carrier::Usps),
            "dhl" => Ok(Carrier::Dhl),
            _ => Err(UnknownCarrier(s.to_string())),
        }
    }
}

/// Immutable descriptor of a shipment to score.
///
/// The expected delivery date is kept as the raw `YYYY-MM-DD` string the
/// caller supplied; collectors that need a calendar date parse it themselves
/// and fall back to their documented defaults when it is malformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub package_id: String,
    pub destination_zip: String,
    pub destination_city: String,
    pub carrier: Carrier,
    pub expected_delivery_date: String,
}
