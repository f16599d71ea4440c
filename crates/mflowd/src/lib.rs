//! mflow daemon library entry.
//!
//! This crate wires the aggregation engine, the scrape rendezvous, the
//! exposition sink, and the source adapters into a running daemon. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod cli;
pub mod config;
pub mod engine;
pub mod obs;
pub mod ops;
pub mod router;
pub mod source;
