//! Error types for the Pellet simulator.
//!
//! All crates return `PelletResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the Pellet simulator.
#[derive(Debug, Error)]
pub enum PelletError {
    /// Configuration value is invalid. Raised at initialization,
    /// never mid-simulation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Compute backend could not be created or dispatched.
    #[error("Compute backend error: {0}")]
    Compute(String),

    /// Buffer sizes disagree with what a stage expects.
    #[error("Buffer mismatch: expected {expected} elements, got {actual}")]
    BufferMismatch {
        expected: usize,
        actual: usize,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, PelletError>`.
pub type PelletResult<T> = Result<T, PelletError>;
