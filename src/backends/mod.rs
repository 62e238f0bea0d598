//! Scanning backend implementations.
//!
//! Each backend implements the [`Engine`] capability interface
//! (`scan`, `version`, `name`). The [`Backend`] enum holds the one
//! variant selected from configuration when the
//! [`Scanner`](crate::Scanner) is built; selection never changes for
//! the lifetime of the instance.
//!
//! ## Available backends
//!
//! - [`tcp::DaemonTcp`] - clamd INSTREAM protocol over TCP
//! - [`unix::DaemonUnixSocket`] - clamd INSTREAM protocol over a Unix socket
//! - [`api::ApiClient`] - HTTPS multipart upload to a scanning API
//! - [`mock::MockBackend`] - configurable stub for tests

pub mod api;
mod instream;
pub mod mock;
pub mod tcp;

#[cfg(unix)]
pub mod unix;

pub use api::ApiClient;
pub use mock::MockBackend;
pub use tcp::DaemonTcp;

#[cfg(unix)]
pub use unix::DaemonUnixSocket;

use crate::audit::EventSink;
use crate::core::{ConfigError, FileReference, ScanMode, ScanVerdict, ScannerConfig};

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// The capability interface every scanning backend provides.
///
/// `scan` is infallible from the caller's point of view: backend
/// failures are absorbed into the returned verdict after emitting a
/// warning event, never propagated as errors.
#[async_trait]
pub trait Engine: Send + Sync + Debug {
    /// Stable identifier of the backend, e.g. `daemon-tcp`.
    fn name(&self) -> &str;

    /// Scans the file and returns a verdict.
    async fn scan(&self, file: &FileReference) -> ScanVerdict;

    /// Returns the engine version, or `None` if it cannot be determined.
    async fn version(&self) -> Option<String>;
}

/// The backend selected for a [`Scanner`](crate::Scanner) instance.
///
/// Chosen once, deterministically, from [`ScanMode`] at construction; a
/// mode whose parameters are missing is a [`ConfigError`] rather than a
/// silently unset backend.
#[derive(Debug)]
pub enum Backend {
    /// clamd daemon over TCP.
    DaemonTcp(DaemonTcp),

    /// clamd daemon over a Unix domain socket.
    #[cfg(unix)]
    DaemonUnixSocket(DaemonUnixSocket),

    /// Remote scanning API over HTTPS.
    Api(ApiClient),

    /// A caller-provided engine, used for stubs in tests and for
    /// embedding engines this crate does not ship.
    Custom(Arc<dyn Engine>),
}

impl Backend {
    /// Builds the backend named by the configuration's scan mode.
    pub fn from_config(
        config: &ScannerConfig,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        match config.mode {
            ScanMode::DaemonTcp => {
                let params = config
                    .daemon_tcp
                    .clone()
                    .ok_or(ConfigError::MissingParameters {
                        mode: config.mode,
                        missing: "daemon_tcp",
                    })?;
                Ok(Self::DaemonTcp(DaemonTcp::new(
                    params,
                    config.io_timeout,
                    events,
                )))
            }
            ScanMode::DaemonUnixSocket => {
                #[cfg(unix)]
                {
                    let params =
                        config
                            .daemon_unix_socket
                            .clone()
                            .ok_or(ConfigError::MissingParameters {
                                mode: config.mode,
                                missing: "daemon_unix_socket",
                            })?;
                    Ok(Self::DaemonUnixSocket(DaemonUnixSocket::new(
                        params,
                        config.io_timeout,
                        events,
                    )))
                }
                #[cfg(not(unix))]
                {
                    Err(ConfigError::UnsupportedPlatform)
                }
            }
            ScanMode::Api => {
                let params = config.api.clone().ok_or(ConfigError::MissingParameters {
                    mode: config.mode,
                    missing: "api",
                })?;
                Ok(Self::Api(ApiClient::new(
                    params,
                    config.api_outage_verdict,
                    events,
                )?))
            }
        }
    }

    /// Returns the backend's stable identifier.
    pub fn name(&self) -> &str {
        match self {
            Self::DaemonTcp(engine) => engine.name(),
            #[cfg(unix)]
            Self::DaemonUnixSocket(engine) => engine.name(),
            Self::Api(engine) => engine.name(),
            Self::Custom(engine) => engine.name(),
        }
    }

    /// Scans the file with the selected backend.
    pub async fn scan(&self, file: &FileReference) -> ScanVerdict {
        match self {
            Self::DaemonTcp(engine) => engine.scan(file).await,
            #[cfg(unix)]
            Self::DaemonUnixSocket(engine) => engine.scan(file).await,
            Self::Api(engine) => engine.scan(file).await,
            Self::Custom(engine) => engine.scan(file).await,
        }
    }

    /// Returns the selected backend's engine version.
    pub async fn version(&self) -> Option<String> {
        match self {
            Self::DaemonTcp(engine) => engine.version().await,
            #[cfg(unix)]
            Self::DaemonUnixSocket(engine) => engine.version().await,
            Self::Api(engine) => engine.version().await,
            Self::Custom(engine) => engine.version().await,
        }
    }
}
