use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::PriceError;

/// USD price for one price key, as served by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub price_key: String,
    /// 0 when `condition` is set; never read as a real price in that case.
    pub usd_per_unit: f64,
    /// When the quote service produced this price. `None` for failed fetches,
    /// which are never cached.
    pub fetched_at: Option<DateTime<Utc>>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_condition")]
    pub condition: Option<PriceError>,
}

fn serialize_condition<S>(condition: &Option<PriceError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match condition {
        Some(err) => serializer.serialize_str(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

impl PriceQuote {
    pub fn available(
        price_key: impl Into<String>,
        usd_per_unit: f64,
        fetched_at: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            price_key: price_key.into(),
            usd_per_unit,
            fetched_at: Some(fetched_at),
            source: source.into(),
            condition: None,
        }
    }

    pub fn unavailable(price_key: impl Into<String>, source: impl Into<String>, condition: PriceError) -> Self {
        Self {
            price_key: price_key.into(),
            usd_per_unit: 0.0,
            fetched_at: None,
            source: source.into(),
            condition: Some(condition),
        }
    }

    pub fn is_available(&self) -> bool {
        self.condition.is_none()
    }
}
