//! Aggregation engine.
//!
//! - `registry`: per-name aggregators and their per-series storage
//! - `aggregate`: the accumulation rules (`Engine::apply`)
//! - `actor`: the single-consumer loop that owns the engine
//! - `scrape`: the rendezvous that hands a snapshot to the exposition handler

pub mod actor;
pub mod aggregate;
pub mod registry;
pub mod scrape;

pub use actor::{channel, spawn, EngineActor, EngineHandle, Termination};
pub use aggregate::{ApplyOutcome, Engine};
pub use registry::{Aggregator, Registry, SeriesKind};
pub use scrape::{ScrapeClient, ScrapeSignal, SnapshotHandle};
