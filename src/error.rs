//! Error types for dci.

use thiserror::Error;

/// Errors that can occur during construction, insertion or search.
///
/// Internal invariant violations (a projection store whose length diverges
/// from the point count) are not represented here: they panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetrieveError {
    /// Input vector length differs from the configured dimension.
    #[error("dimension mismatch: expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Construction parameters are unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Query issued before any point was inserted.
    #[error("index is empty")]
    EmptyIndex,

    /// Every id representable as `u32` has been handed out.
    #[error("index is full: at most {limit} points can be stored")]
    CapacityExceeded { limit: usize },
}

pub type Result<T> = std::result::Result<T, RetrieveError>;
