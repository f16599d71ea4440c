//! Metric-update event (JSON).

use serde::{Deserialize, Serialize};

use crate::error::{MflowError, Result};

/// One label name/value pair as sent by producers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelNameValue {
    pub name: String,
    pub value: String,
}

/// Raw metric-update event, one per source record.
///
/// `name` is `<base>_<kind>`; the kind suffix picks the aggregation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricUpdateEvent {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub label_name_value_pairs: Vec<LabelNameValue>,
}

impl MetricUpdateEvent {
    /// Parse an event from a raw payload.
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| MflowError::Decode(format!("invalid event json: {e}")))
    }
}
