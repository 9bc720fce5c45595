//! Error types for `Lynx`.
//!
//! This module provides a unified error type for all engine operations.
//! Error codes follow the pattern `LYNX-XXX` for easy debugging.

use thiserror::Error;

/// Result type alias for `Lynx` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `Lynx` operations.
///
/// Each variant includes a descriptive error message suitable for end-users.
#[derive(Error, Debug)]
pub enum Error {
    /// Dimension mismatch (LYNX-001).
    #[error("[LYNX-001] Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Empty input (LYNX-002).
    #[error("[LYNX-002] Empty input: {0}")]
    EmptyInput(&'static str),

    /// Invalid k (LYNX-003).
    #[error("[LYNX-003] Invalid k: {0} (must be greater than 0)")]
    InvalidK(usize),

    /// Index not trained (LYNX-004).
    #[error("[LYNX-004] IVF index is not trained; call update() after inserting at least nlist vectors")]
    NotTrained,

    /// Insufficient training data (LYNX-005).
    #[error("[LYNX-005] Insufficient data for training: need at least {needed} vectors, have {available}")]
    InsufficientData {
        /// Minimum number of vectors required (nlist).
        needed: usize,
        /// Number of vectors currently stored.
        available: usize,
    },

    /// Invalid configuration (LYNX-006).
    #[error("[LYNX-006] Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Id out of range (LYNX-007).
    #[error("[LYNX-007] Vector id {id} out of range (store holds {size} vectors)")]
    IdOutOfRange {
        /// Requested id.
        id: u64,
        /// Number of vectors in the store.
        size: usize,
    },

    /// Invalid vector data (LYNX-008).
    #[error("[LYNX-008] Invalid vector: {0}")]
    InvalidVector(String),

    /// Snapshot file corrupted or incompatible (LYNX-009).
    #[error("[LYNX-009] Snapshot error: {0}")]
    Snapshot(String),

    /// IO error (LYNX-010).
    #[error("[LYNX-010] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// External backend error (LYNX-011).
    ///
    /// Raised by collaborators outside the core: the embedding service or
    /// the relational persistence layer.
    #[error("[LYNX-011] Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Returns the error code (e.g., "LYNX-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "LYNX-001",
            Self::EmptyInput(_) => "LYNX-002",
            Self::InvalidK(_) => "LYNX-003",
            Self::NotTrained => "LYNX-004",
            Self::InsufficientData { .. } => "LYNX-005",
            Self::InvalidConfig(_) => "LYNX-006",
            Self::IdOutOfRange { .. } => "LYNX-007",
            Self::InvalidVector(_) => "LYNX-008",
            Self::Snapshot(_) => "LYNX-009",
            Self::Io(_) => "LYNX-010",
            Self::Backend(_) => "LYNX-011",
        }
    }

    /// Returns true if this error is recoverable by the caller.
    ///
    /// Non-recoverable errors indicate corrupted files or failing
    /// external services rather than bad request parameters.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Snapshot(_) | Self::Io(_) | Self::Backend(_))
    }
}
