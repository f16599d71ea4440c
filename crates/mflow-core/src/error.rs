//! Shared error type across mflow crates.

use thiserror::Error;

use crate::sample::MetricKind;

/// Stable error codes, used as log fields and metric label values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Metric name without a kind suffix, or a base name that is not a valid
    /// exposition metric name.
    MalformedName,
    /// Label name that is not a valid exposition label name (or uses `__`).
    InvalidLabelName,
    /// Base name inside the daemon's own metric namespace.
    ReservedName,
    /// Payload is not a valid metric-update event.
    DecodeFailure,
    /// Kind differs from the kind established for the name.
    TypeConflict,
    /// Kind suffix is not a supported aggregation.
    UnknownKind,
    /// Label names differ from the schema fixed by the first sample.
    LabelSchemaMismatch,
    /// Value cannot be accumulated (negative or non-finite counter increment).
    InvalidValue,
    /// A source adapter could not read its source.
    SourceFailure,
    /// Invalid process configuration.
    Config,
    /// The aggregation engine is no longer running.
    EngineUnavailable,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MalformedName => "malformed_name",
            ErrorCode::InvalidLabelName => "invalid_label_name",
            ErrorCode::ReservedName => "reserved_name",
            ErrorCode::DecodeFailure => "decode_failure",
            ErrorCode::TypeConflict => "type_conflict",
            ErrorCode::UnknownKind => "unknown_kind",
            ErrorCode::LabelSchemaMismatch => "label_schema_mismatch",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::SourceFailure => "source_failure",
            ErrorCode::Config => "config",
            ErrorCode::EngineUnavailable => "engine_unavailable",
            ErrorCode::Internal => "internal",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MflowError>;

/// Unified error type used by core and daemon.
#[derive(Debug, Error)]
pub enum MflowError {
    #[error("malformed metric name {0:?}: expected <base>_<kind> with base [a-zA-Z_:][a-zA-Z0-9_:]*")]
    MalformedName(String),
    #[error("invalid label name {0:?}")]
    InvalidLabelName(String),
    #[error("metric name {0:?} is reserved for daemon metrics")]
    ReservedName(String),
    #[error("decode failure: {0}")]
    Decode(String),
    #[error("type conflict for '{name}': established {established}, got {got}")]
    TypeConflict {
        name: String,
        established: MetricKind,
        got: MetricKind,
    },
    #[error("unknown aggregation kind '{kind}' for '{name}'")]
    UnknownKind { name: String, kind: String },
    #[error("label schema mismatch for '{name}': expected {expected:?}, got {got:?}")]
    LabelSchemaMismatch {
        name: String,
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("invalid value {value} for counter '{name}'")]
    InvalidValue { name: String, value: f64 },
    #[error("source failure: {0}")]
    Source(String),
    #[error("config: {0}")]
    Config(String),
    #[error("aggregation engine unavailable")]
    EngineUnavailable,
    #[error("internal: {0}")]
    Internal(String),
}

impl MflowError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MflowError::MalformedName(_) => ErrorCode::MalformedName,
            MflowError::InvalidLabelName(_) => ErrorCode::InvalidLabelName,
            MflowError::ReservedName(_) => ErrorCode::ReservedName,
            MflowError::Decode(_) => ErrorCode::DecodeFailure,
            MflowError::TypeConflict { .. } => ErrorCode::TypeConflict,
            MflowError::UnknownKind { .. } => ErrorCode::UnknownKind,
            MflowError::LabelSchemaMismatch { .. } => ErrorCode::LabelSchemaMismatch,
            MflowError::InvalidValue { .. } => ErrorCode::InvalidValue,
            MflowError::Source(_) => ErrorCode::SourceFailure,
            MflowError::Config(_) => ErrorCode::Config,
            MflowError::EngineUnavailable => ErrorCode::EngineUnavailable,
            MflowError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Errors caused by one bad record; the record is dropped and ingestion goes on.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::MalformedName
                | ErrorCode::InvalidLabelName
                | ErrorCode::ReservedName
                | ErrorCode::DecodeFailure
                | ErrorCode::TypeConflict
                | ErrorCode::UnknownKind
                | ErrorCode::LabelSchemaMismatch
                | ErrorCode::InvalidValue
        )
    }
}
