//! Error types for playlist-bridge-core

use std::time::Duration;

use thiserror::Error;

use crate::track::Platform;

/// Main error type for transfer operations
///
/// Only setup, authentication and cancellation failures surface here.
/// Per-track search and write failures are recorded on the
/// [`TransferResult`](crate::transfer::TransferResult) instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Destination playlist on {platform} could not be created: {reason}")]
    DestinationUnavailable { platform: Platform, reason: String },

    #[error("Authentication with {platform} expired, please reconnect the account")]
    AuthExpired { platform: Platform },

    #[error("Invalid transfer request: {0}")]
    InvalidRequest(String),

    #[error("Transfer cancelled by user")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for playlist-bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a catalog or playlist port
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("Platform unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limited by platform")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Request timed out")]
    Timeout,

    #[error("Access token expired or revoked")]
    AuthExpired,
}

impl PortError {
    /// Whether the failure is transient and the call may be retried
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::AuthExpired)
    }

    /// Minimum wait requested by the platform before the next attempt
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}
