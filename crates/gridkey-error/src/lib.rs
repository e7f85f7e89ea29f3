//! Error type shared by every gridkey crate.
//!
//! Variants split into two groups:
//! - configuration / malformed-input errors, fatal before any search work
//! - per-candidate errors (invalid scalars), which the orchestrator treats
//!   as "no match" and never propagates out of a run

use thiserror::Error;

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, GridKeyError>;

#[derive(Debug, Error)]
pub enum GridKeyError {
    /// The measurement document did not contain exactly one record per cell.
    #[error("expected {expected} cell measurements, got {actual}")]
    MeasurementCount { expected: usize, actual: usize },

    /// A single cell record failed validation (bad index, layout, non-finite value).
    #[error("malformed measurement for cell {index}: {detail}")]
    MalformedMeasurement { index: usize, detail: String },

    /// A requested catalog entry (area source, pairing scheme) does not exist.
    #[error("unknown {kind} requested: {names}")]
    UnknownName { kind: &'static str, names: String },

    #[error("unsupported adjustment mode: {0}")]
    UnsupportedAdjustmentMode(String),

    /// A base traversal order is not a permutation of the grid indices.
    #[error("traversal order `{name}` is invalid: {detail}")]
    InvalidTraversalOrder { name: String, detail: String },

    /// A pairing scheme is not a perfect partition of the grid indices.
    #[error("pairing scheme `{name}` is invalid: {detail}")]
    InvalidPairing { name: String, detail: String },

    #[error("no combinations to evaluate")]
    EmptyCombinationSet,

    #[error("start index {start} must be less than end index {end}")]
    InvalidRange { start: usize, end: usize },

    /// The 32-byte value is zero or not below the curve order.
    #[error("value is not a valid secp256k1 private scalar")]
    InvalidScalar,

    #[error("invalid address `{address}`: {detail}")]
    InvalidAddress { address: String, detail: String },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("serialization failure: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GridKeyError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn malformed(index: usize, detail: impl Into<String>) -> Self {
        Self::MalformedMeasurement {
            index,
            detail: detail.into(),
        }
    }

    pub fn unknown(kind: &'static str, names: &[String]) -> Self {
        Self::UnknownName {
            kind,
            names: names.join(", "),
        }
    }

    /// Whether this error is detected before search work starts and should
    /// be reported as a usage/configuration failure.
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MeasurementCount { .. }
                | Self::MalformedMeasurement { .. }
                | Self::UnknownName { .. }
                | Self::UnsupportedAdjustmentMode(_)
                | Self::InvalidTraversalOrder { .. }
                | Self::InvalidPairing { .. }
                | Self::EmptyCombinationSet
                | Self::InvalidRange { .. }
                | Self::InvalidAddress { .. }
                | Self::InvalidOption(_)
        )
    }
}
