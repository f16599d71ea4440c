//! Event normalizer: raw metric-update event -> `MetricSample`.
//!
//! Rules:
//! - The name is split at the **last** `_`: the head is the base name, the
//!   tail is the kind suffix. Base names may themselves contain `_`.
//! - Labels are deduplicated by name and sorted, so label order on the wire
//!   never selects a different series.
//! - The base name must match `[a-zA-Z_:][a-zA-Z0-9_:]*` and label names
//!   `[a-zA-Z_][a-zA-Z0-9_]*` without the reserved `__` prefix, so every
//!   accepted sample renders as valid exposition text.
//! - The kind suffix is not validated here; the engine rejects unknown kinds.

use crate::error::{MflowError, Result};
use crate::protocol::MetricUpdateEvent;
use crate::sample::{LabelSet, MetricKind, MetricSample};

/// Separator between base name and kind suffix.
pub const KIND_SEPARATOR: char = '_';

/// Split `<base>_<kind>` at the last separator.
pub fn split_name(name: &str) -> Result<(&str, &str)> {
    match name.rsplit_once(KIND_SEPARATOR) {
        Some((base, kind)) if !base.is_empty() && !kind.is_empty() => Ok((base, kind)),
        _ => Err(MflowError::MalformedName(name.to_string())),
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, not starting with `__`.
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Normalize a decoded event, stamping it with `timestamp` (unix seconds).
pub fn normalize(event: MetricUpdateEvent, timestamp: i64) -> Result<MetricSample> {
    let (base, kind) = split_name(&event.name)?;
    if !is_valid_metric_name(base) {
        return Err(MflowError::MalformedName(event.name.clone()));
    }
    if let Some(bad) = event
        .label_name_value_pairs
        .iter()
        .find(|p| !is_valid_label_name(&p.name))
    {
        return Err(MflowError::InvalidLabelName(bad.name.clone()));
    }

    let labels = LabelSet::from_pairs(
        event
            .label_name_value_pairs
            .into_iter()
            .map(|p| (p.name, p.value)),
    );

    Ok(MetricSample::new(
        base,
        MetricKind::from_suffix(kind),
        labels,
        event.value,
        timestamp,
    ))
}

/// Decode a raw JSON payload and normalize it.
pub fn decode(payload: &[u8], timestamp: i64) -> Result<MetricSample> {
    let event = MetricUpdateEvent::from_slice(payload)?;
    normalize(event, timestamp)
}
