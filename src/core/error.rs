//! Error types for the virusgate library.
//!
//! Backend failures are absorbed into the `Unchecked` verdict (or the
//! configured API outage verdict) plus a warning event; they never reach
//! the caller of [`Scanner::scan`](crate::Scanner::scan) as errors. The
//! only hard failure is construction-time misconfiguration.

use std::time::Duration;
use thiserror::Error;

use crate::core::config::ScanMode;

/// Internal error for a failed scan attempt.
///
/// These are produced inside backends and converted into verdicts before
/// a scan call returns; they appear in warning events, not in return
/// types of the public scan API.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Could not open a connection to the scanning daemon or service.
    #[error("connection to {target} failed: {message}")]
    ConnectionFailed {
        /// The address that was dialled (`host:port` or a socket path).
        target: String,
        /// Error message describing the failure.
        message: String,
    },

    /// An I/O failure occurred mid-protocol (write or read).
    #[error("I/O error during scan protocol: {0}")]
    Io(#[from] std::io::Error),

    /// A connect/write/read step exceeded the configured deadline.
    #[error("scan timed out after {elapsed:?} talking to {target}")]
    Timeout {
        /// The address being talked to.
        target: String,
        /// The deadline that was exceeded.
        elapsed: Duration,
    },

    /// The file cannot be framed by the INSTREAM 4-byte length prefix.
    #[error("file size {size} bytes exceeds the {max} byte INSTREAM frame limit")]
    FileTooLarge {
        /// Actual file size in bytes.
        size: u64,
        /// Largest size the wire format can express.
        max: u64,
    },

    /// The HTTP request to the scanning API failed.
    #[error("transport error from '{backend}': {message}")]
    Transport {
        /// Name of the backend.
        backend: String,
        /// Error message describing the failure.
        message: String,
    },
}

impl ScanError {
    /// Creates a `ConnectionFailed` error.
    pub fn connection_failed(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Creates a `Timeout` error.
    pub fn timeout(target: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            target: target.into(),
            elapsed,
        }
    }

    /// Creates a `Transport` error.
    pub fn transport(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

/// Construction-time configuration error.
///
/// Produced when a [`Scanner`](crate::Scanner) is built from a
/// configuration whose selected mode is missing its parameters.
/// Misconfiguration fails here, at construction, never as a silently
/// unset backend at scan time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The selected scan mode is missing its connection parameters.
    #[error("scan mode {mode:?} requires {missing} to be configured")]
    MissingParameters {
        /// The selected mode.
        mode: ScanMode,
        /// Human-readable name of the missing parameter block.
        missing: &'static str,
    },

    /// Unix socket mode selected on a platform without Unix sockets.
    #[error("unix socket mode is not supported on this platform")]
    UnsupportedPlatform,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::connection_failed("localhost:3310", "connection refused");
        assert!(err.to_string().contains("localhost:3310"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_file_too_large_display() {
        let err = ScanError::FileTooLarge {
            size: 5_000_000_000,
            max: u64::from(u32::MAX),
        };
        assert!(err.to_string().contains("5000000000"));
    }

    #[test]
    fn test_config_error_names_missing_block() {
        let err = ConfigError::MissingParameters {
            mode: ScanMode::DaemonTcp,
            missing: "daemon_tcp",
        };
        assert!(err.to_string().contains("daemon_tcp"));
    }
}
