//! Daemon config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use mflow_core::error::{MflowError, Result};

pub use schema::{MflowConfig, PubSubSection, ServerSection, SourceKind, SourceSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<MflowConfig> {
    let cfg = parse_file(path)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<MflowConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse without validating, so command-line overrides can be applied first.
pub fn parse_file(path: impl AsRef<Path>) -> Result<MflowConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .map_err(|e| MflowError::Config(format!("read {} failed: {e}", path.display())))?;
    parse_str(&s)
}

pub fn parse_str(s: &str) -> Result<MflowConfig> {
    serde_yaml::from_str(s).map_err(|e| MflowError::Config(format!("invalid yaml: {e}")))
}
