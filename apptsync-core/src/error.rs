//! Error types for apptsync.

use thiserror::Error;

/// Errors that can occur in apptsync operations.
#[derive(Error, Debug)]
pub enum ApptSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Invalid timestamp '{0}'")]
    TimestampParse(String),

    #[error("Appointment file parse error: {0}")]
    AppointmentParse(String),

    #[error("Appointment file write error: {0}")]
    AppointmentWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for apptsync operations.
pub type ApptSyncResult<T> = Result<T, ApptSyncError>;
