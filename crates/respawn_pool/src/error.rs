//! # Pool Error Types
//!
//! Pool cache operations themselves degrade gracefully and never return
//! errors; the hard failures all live at the configuration boundary.

use thiserror::Error;

/// Errors that can occur while loading or applying pool configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Configuration did not parse or failed validation.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// A prewarm entry names a prototype the host has not registered.
    #[error("unknown prototype in pool configuration: {name}")]
    UnknownPrototype {
        /// The unresolvable prototype name.
        name: String,
    },
}

/// Result type for pool configuration operations.
pub type PoolResult<T> = Result<T, PoolError>;
