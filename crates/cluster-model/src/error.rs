//! Validation errors for canonical requests

use thiserror::Error;

/// Errors raised while validating a canonical request before any provider call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Node count bounds are inconsistent
    #[error("invalid scaling bounds (desired={desired}, min={min}, max={max}): {reason}")]
    InvalidBounds {
        desired: u32,
        min: u32,
        max: u32,
        reason: &'static str,
    },

    /// A node-group inside a cluster request failed validation
    #[error("node group {name}: {source}")]
    NodeGroup {
        name: String,
        #[source]
        source: Box<ValidationError>,
    },
}
