//! mflow core: transport-agnostic event model, metric samples, and the error surface.
//!
//! This crate defines the wire-level event contract, the canonical `MetricSample`
//! handed to the aggregation engine, and the normalizer that turns one into the
//! other. It carries no runtime or transport dependencies so adapters, the
//! daemon, and tests can all share it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed input is
//! always surfaced as `MflowError` so a bad record can never take the
//! process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod normalize;
pub mod protocol;
pub mod sample;

/// Shared result type.
pub use error::{ErrorCode, MflowError, Result};
pub use normalize::{decode, normalize};
pub use sample::{LabelSet, MetricKind, MetricSample};
