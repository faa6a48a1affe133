//! Pulse effect errors

use crate::host::HostError;
use thiserror::Error;

/// Errors raised by the pulse effect
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PulseError {
    /// A setting was rejected before any host resource was touched
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfiguration {
        /// Offending setting
        field: &'static str,
        /// What the value violated
        reason: String,
    },

    /// The emitter was already disposed
    #[error("`{operation}` called on a disposed emitter")]
    OperationAfterDispose {
        /// Method the caller invoked
        operation: &'static str,
    },

    /// The host failed an allocation, update or render
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

impl PulseError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration { field, reason: reason.into() }
    }
}

/// Result alias for pulse operations
pub type PulseResult<T> = Result<T, PulseError>;
