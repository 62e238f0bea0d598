//! Daemon backend over a Unix domain socket.
//!
//! Same INSTREAM protocol as the TCP backend, dialled over a filesystem
//! socket path instead of host and port.

use crate::audit::{EventLevel, EventSink, ScanEvent};
use crate::backends::instream;
use crate::backends::Engine;
use crate::core::{DaemonUnixSocketConfig, FileReference, ScanError, ScanVerdict};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UnixStream;
use tokio::time::timeout;

/// Scanning backend that speaks the INSTREAM protocol to a clamd daemon
/// over a Unix domain socket.
#[derive(Debug)]
pub struct DaemonUnixSocket {
    params: DaemonUnixSocketConfig,
    io_timeout: Duration,
    events: Arc<dyn EventSink>,
}

impl DaemonUnixSocket {
    /// Creates a Unix socket daemon backend.
    pub fn new(
        params: DaemonUnixSocketConfig,
        io_timeout: Duration,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            params,
            io_timeout,
            events,
        }
    }

    fn socket_display(&self) -> String {
        self.params.socket_path.display().to_string()
    }

    async fn connect(&self) -> Result<UnixStream, ScanError> {
        let target = self.socket_display();
        match timeout(self.io_timeout, UnixStream::connect(&self.params.socket_path)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(err)) => Err(ScanError::connection_failed(target, err.to_string())),
            Err(_) => Err(ScanError::timeout(target, self.io_timeout)),
        }
    }

    fn warn(&self, message: String, file: Option<&FileReference>) {
        let mut event = ScanEvent::new(EventLevel::Warning, message)
            .with_target(self.socket_display())
            .with_backend(self.name());
        if let Some(file) = file {
            event = event.with_file(file);
        }
        self.events.emit(&event);
    }
}

#[async_trait]
impl Engine for DaemonUnixSocket {
    fn name(&self) -> &str {
        "daemon-unix-socket"
    }

    async fn scan(&self, file: &FileReference) -> ScanVerdict {
        let mut stream = match self.connect().await {
            Ok(stream) => stream,
            Err(err) => {
                self.warn(
                    format!(
                        "Unable to connect to antivirus daemon on unix socket {}: {}",
                        self.socket_display(),
                        err
                    ),
                    Some(file),
                );
                return ScanVerdict::Unchecked;
            }
        };

        match timeout(self.io_timeout, instream::scan_stream(&mut stream, file)).await {
            Ok(Ok(response)) => instream::parse_verdict(&response),
            Ok(Err(err)) => {
                self.warn(format!("Scan of {} failed: {}", file.uri(), err), Some(file));
                ScanVerdict::Unchecked
            }
            Err(_) => {
                self.warn(
                    format!(
                        "Scan of {} timed out after {:?}",
                        file.uri(),
                        self.io_timeout
                    ),
                    Some(file),
                );
                ScanVerdict::Unchecked
            }
        }
    }

    async fn version(&self) -> Option<String> {
        let mut stream = match self.connect().await {
            Ok(stream) => stream,
            Err(err) => {
                self.warn(
                    format!(
                        "Unable to connect to antivirus daemon on unix socket {}: {}",
                        self.socket_display(),
                        err
                    ),
                    None,
                );
                return None;
            }
        };

        match timeout(self.io_timeout, instream::query_version(&mut stream)).await {
            Ok(Ok(line)) => Some(line),
            Ok(Err(err)) => {
                self.warn(format!("Version query failed: {}", err), None);
                None
            }
            Err(_) => {
                self.warn(
                    format!("Version query timed out after {:?}", self.io_timeout),
                    None,
                );
                None
            }
        }
    }
}
