//! Error types for 802.11 control operations.

use std::io;

/// Result type for 802.11 control operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a control request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The interface lacks the capability, or the link is absent.
    #[error("no such device")]
    NoDevice,

    /// A request field failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced entry (node, peer) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation is not allowed on this entry.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The link is present but not up and running.
    #[error("network is down")]
    NetworkDown,

    /// Unknown or unimplemented command.
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// Request buffer is shorter than the command's record.
    #[error("request truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Size of the record.
        expected: usize,
        /// Bytes available in the buffer.
        actual: usize,
    },

    /// Driver or state machine callback failed.
    #[error("{operation}: {message} (errno {errno})")]
    Driver {
        /// The operation that failed.
        operation: String,
        /// The errno value reported by the callback.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Invalid configuration profile.
    #[error("config error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[cfg(feature = "config")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a driver error from an errno value with operation context.
    ///
    /// Accepts either sign convention; the stored errno is positive.
    pub fn driver(operation: impl Into<String>, errno: i32) -> Self {
        let errno = errno.abs();
        Self::Driver {
            operation: operation.into(),
            errno,
            message: io::Error::from_raw_os_error(errno).to_string(),
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) | Self::NoDevice => true,
            Self::Driver { errno, .. } => matches!(*errno, libc::ENOENT | libc::ENODEV),
            _ => false,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied(_) => true,
            Self::Driver { errno, .. } => matches!(*errno, libc::EPERM | libc::EACCES),
            _ => false,
        }
    }

    /// Check if this is a validation failure (EINVAL).
    pub fn is_invalid(&self) -> bool {
        match self {
            Self::InvalidArgument(_) => true,
            Self::Driver { errno, .. } => *errno == libc::EINVAL,
            _ => false,
        }
    }

    /// Check if the command is unknown or unimplemented.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    /// Get the errno value this error reports across the boundary.
    pub fn errno(&self) -> i32 {
        match self {
            Self::NoDevice => libc::ENODEV,
            Self::InvalidArgument(_) | Self::Config(_) => libc::EINVAL,
            Self::NotFound(_) => libc::ENOENT,
            Self::PermissionDenied(_) => libc::EPERM,
            Self::NetworkDown => libc::ENETDOWN,
            Self::NotSupported(_) => libc::ENOTTY,
            Self::Truncated { .. } => libc::EFAULT,
            Self::Driver { errno, .. } => *errno,
            #[cfg(feature = "config")]
            Self::Json(_) => libc::EINVAL,
            Self::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
        }
    }
}

/// Result of a successful command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The change took effect; nothing else to do.
    Applied,
    /// The change requires the caller to restart association.
    ResetRequired,
}

impl Outcome {
    /// Check if the caller must trigger a network reset.
    pub fn is_reset(&self) -> bool {
        matches!(self, Outcome::ResetRequired)
    }

    /// Outcome for a change that resets only when `reset` holds.
    pub fn reset_if(reset: bool) -> Self {
        if reset {
            Outcome::ResetRequired
        } else {
            Outcome::Applied
        }
    }
}

/// Map a command result to a signed status code.
///
/// Returns 0 when applied, `-ENETRESET` when a reset is required and
/// `-errno` for errors.
pub fn ioctl_status(result: &Result<Outcome>) -> i32 {
    match result {
        Ok(Outcome::Applied) => 0,
        Ok(Outcome::ResetRequired) => -libc::ENETRESET,
        Err(e) => -e.errno(),
    }
}
