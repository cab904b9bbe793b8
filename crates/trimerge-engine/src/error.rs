//! Error types for the engine crate.
//!
//! The merge itself is infallible by contract; only the configuration
//! surface can fail, when an operation name from a config file or CLI flag
//! does not parse.

use thiserror::Error;

/// Errors produced while building a merge configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An unknown field-fallback name (expected `FALLBACK_KEEP_HEAD` or
    /// `FALLBACK_KEEP_UPDATE`).
    #[error("unknown field fallback: {0:?}")]
    UnknownFieldFallback(String),

    /// An unknown list-unification name (e.g. `KEEP_ONLY_HEAD_ENTITIES`).
    #[error("unknown list unification operation: {0:?}")]
    UnknownListOp(String),
}
