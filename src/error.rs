//! Typed errors raised by this layer.
//!
//! Runner failures have no variant here: whatever the backup runner
//! returns is an opaque `anyhow::Error` and travels back to the caller as-is.

use thiserror::Error;

/// A flag combination that cannot describe a backup.
///
/// Raised by [`crate::config::BackupConfig::from_flags`] before anything is
/// dispatched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty database name is not allowed (use --db)")]
    MissingDatabase,

    #[error("empty table name is not allowed (use --table)")]
    MissingTable,

    #[error("at least one PD address is required (use --pd)")]
    MissingPd,

    #[error("a storage URL is required (use --storage)")]
    MissingStorage,

    #[error("concurrency must be greater than zero")]
    ZeroConcurrency,

    #[error("rate limit must be greater than zero when set")]
    ZeroRateLimit,
}

/// Failure while preparing the runtime before a backup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreflightError {
    #[error("reporting unit is already {current:?}, refusing to switch to {requested:?}")]
    UnitConflict {
        current: &'static str,
        requested: &'static str,
    },
}
