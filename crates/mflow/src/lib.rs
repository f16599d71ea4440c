//! Top-level facade crate for mflow.
//!
//! Re-exports core types and the daemon library so users can depend on a single crate.

pub mod core {
    pub use mflow_core::*;
}

pub mod daemon {
    pub use mflowd::*;
}
