//! Error types for the siege simulation.
//!
//! None of these ever escape a tick: the pipeline logs and drops them.

use thiserror::Error;

use crate::enums::Pool;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A spawn or fire request hit a full pool.
    #[error("{pool} pool is at capacity ({capacity})")]
    PoolFull { pool: Pool, capacity: usize },

    /// A direction vector had zero (or non-finite) length.
    #[error("direction vector is degenerate")]
    DegenerateDirection,

    /// A handle no longer refers to a live entity.
    #[error("entity not found: {0}")]
    EntityNotFound(u64),

    /// Configuration rejected at startup.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
