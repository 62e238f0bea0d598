//! # Virusgate
//!
//! A pluggable malware-scanning client: given a file, determine whether
//! it is clean, infected, or could not be checked, using one of several
//! interchangeable backends.
//!
//! ## Overview
//!
//! Virusgate lets an application that accepts file uploads:
//!
//! - Stream files to a clamd daemon over TCP or a Unix socket using the
//!   INSTREAM wire protocol
//! - Upload files to a Cloudmersive-compatible HTTPS scanning API
//! - Decide per storage scheme whether files should be scanned at all,
//!   with per-scheme overrides and external veto/override hooks
//! - Apply an outage policy (allow or block files that could not be
//!   checked) with matching structured log events
//!
//! The backend is selected once from configuration when the scanner is
//! built; `scan` always returns a verdict and never fails, while
//! misconfiguration is a construction-time error.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use virusgate::core::{DaemonTcpConfig, FileReference, ScanMode, ScannerConfig};
//! use virusgate::Scanner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScannerConfig::new(ScanMode::DaemonTcp)
//!         .with_daemon_tcp(DaemonTcpConfig::new("localhost", 3310));
//!     let scanner = Scanner::builder(config).build()?;
//!
//!     let file = FileReference::from_path("/srv/uploads/report.pdf")?;
//!     if scanner.is_enabled() && scanner.is_scannable(&file) {
//!         let verdict = scanner.scan(&file).await;
//!         if verdict.is_infected() {
//!             eprintln!("infected: {:?}", verdict.virus_name());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Core**: verdicts, file references, configuration, and errors
//! - **Backends**: the daemon (TCP/Unix) and HTTP API engines behind
//!   one capability interface
//! - **Policy**: per-scheme scannability rules and external hooks
//! - **Audit**: structured scan events delivered to an injected sink
//! - **Scanner**: the facade combining all of the above

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod backends;
pub mod core;
pub mod policy;
mod scanner;

// Re-export commonly used types at the crate root
pub use crate::audit::{CollectingSink, EventLevel, EventSink, ScanEvent, TracingSink};
pub use crate::backends::{Backend, Engine, MockBackend};
pub use crate::core::{
    ApiConfig, ApiOutageVerdict, ConfigError, DaemonTcpConfig, DaemonUnixSocketConfig,
    FileReference, OutageAction, ScanError, ScanMode, ScanVerdict, ScannerConfig,
};
pub use crate::policy::{
    ScanOpinion, ScannabilityHook, ScannabilityPolicy, SchemeClassifier, StaticSchemeClassifier,
};
pub use crate::scanner::{Scanner, ScannerBuilder};

/// Prelude module for convenient imports.
///
/// ```rust
/// use virusgate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::audit::{EventLevel, EventSink, ScanEvent, TracingSink};
    pub use crate::backends::{Backend, Engine};
    pub use crate::core::{
        ApiConfig, DaemonTcpConfig, DaemonUnixSocketConfig, FileReference, OutageAction, ScanMode,
        ScanVerdict, ScannerConfig,
    };
    pub use crate::policy::{ScanOpinion, ScannabilityHook, SchemeClassifier};
    pub use crate::scanner::{Scanner, ScannerBuilder};
}
