//! Core types: verdicts, file references, configuration, and errors.

pub mod config;
pub mod error;
pub mod file;
pub mod verdict;

pub use config::{
    ApiConfig, ApiOutageVerdict, DaemonTcpConfig, DaemonUnixSocketConfig, OutageAction, ScanMode,
    ScannerConfig, API_TIMEOUT_MAX_SECS, API_TIMEOUT_MIN_SECS, API_TIMEOUT_STEP_SECS,
    DEFAULT_IO_TIMEOUT,
};
pub use error::{ConfigError, ScanError};
pub use file::FileReference;
pub use verdict::ScanVerdict;
