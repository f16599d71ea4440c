//! Wire formats accepted from metric sources.
//!
//! Sources deliver one JSON metric-update event per record (a file line or a
//! subscription message). Parsing is panic-free: malformed input is reported
//! as `MflowError::Decode`.

pub mod event;

pub use event::{LabelNameValue, MetricUpdateEvent};
