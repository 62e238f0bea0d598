//! Daemon backend over TCP.

use crate::audit::{EventLevel, EventSink, ScanEvent};
use crate::backends::instream;
use crate::backends::Engine;
use crate::core::{DaemonTcpConfig, FileReference, ScanError, ScanVerdict};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Scanning backend that speaks the INSTREAM protocol to a clamd daemon
/// over TCP.
///
/// One connection attempt per scan, no retries: if the daemon is
/// unreachable the verdict is `Unchecked` and a single warning event
/// carrying the target address is emitted.
#[derive(Debug)]
pub struct DaemonTcp {
    params: DaemonTcpConfig,
    io_timeout: Duration,
    events: Arc<dyn EventSink>,
}

impl DaemonTcp {
    /// Creates a TCP daemon backend.
    pub fn new(params: DaemonTcpConfig, io_timeout: Duration, events: Arc<dyn EventSink>) -> Self {
        Self {
            params,
            io_timeout,
            events,
        }
    }

    async fn connect(&self) -> Result<TcpStream, ScanError> {
        let address = self.params.address();
        match timeout(
            self.io_timeout,
            TcpStream::connect((self.params.hostname.as_str(), self.params.port)),
        )
        .await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(err)) => Err(ScanError::connection_failed(address, err.to_string())),
            Err(_) => Err(ScanError::timeout(address, self.io_timeout)),
        }
    }

    fn warn(&self, message: String, file: Option<&FileReference>) {
        let mut event = ScanEvent::new(EventLevel::Warning, message)
            .with_target(self.params.address())
            .with_backend(self.name());
        if let Some(file) = file {
            event = event.with_file(file);
        }
        self.events.emit(&event);
    }
}

#[async_trait]
impl Engine for DaemonTcp {
    fn name(&self) -> &str {
        "daemon-tcp"
    }

    async fn scan(&self, file: &FileReference) -> ScanVerdict {
        let mut stream = match self.connect().await {
            Ok(stream) => stream,
            Err(err) => {
                self.warn(
                    format!(
                        "Unable to connect to antivirus daemon on {}: {}",
                        self.params.address(),
                        err
                    ),
                    Some(file),
                );
                return ScanVerdict::Unchecked;
            }
        };

        // Stream and socket are dropped on every path below.
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
                        "Unable to connect to antivirus daemon on {}: {}",
                        self.params.address(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::CollectingSink;

    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Starts a fake clamd that consumes the INSTREAM exchange and
    /// answers each of `responses` on consecutive connections.
    async fn fake_daemon(responses: Vec<&'static str>) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for response in responses {
                let (mut stream, _) = listener.accept().await.unwrap();

                // Command token and NUL.
                let mut command = [0u8; 10];
                stream.read_exact(&mut command).await.unwrap();
                assert_eq!(&command, b"zINSTREAM\0");

                // Length-prefixed chunks until the zero terminator.
                loop {
                    let mut header = [0u8; 4];
                    stream.read_exact(&mut header).await.unwrap();
                    let len = u32::from_be_bytes(header) as usize;
                    if len == 0 {
                        break;
                    }
                    let mut chunk = vec![0u8; len];
                    stream.read_exact(&mut chunk).await.unwrap();
                }

                stream.write_all(response.as_bytes()).await.unwrap();
                stream.write_all(b"\n").await.unwrap();
            }
        });

        addr
    }

    fn temp_file(content: &[u8]) -> (tempfile::NamedTempFile, FileReference) {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(content).unwrap();
        tmp.flush().unwrap();
        let file = FileReference::from_path(tmp.path()).unwrap();
        (tmp, file)
    }

    fn backend(addr: std::net::SocketAddr, sink: Arc<CollectingSink>) -> DaemonTcp {
        DaemonTcp::new(
            DaemonTcpConfig::new(addr.ip().to_string(), addr.port()),
            Duration::from_secs(5),
            sink,
        )
    }

    #[tokio::test]
    async fn test_scan_clean() {
        let addr = fake_daemon(vec!["stream: OK"]).await;
        let sink = Arc::new(CollectingSink::new());
        let (_tmp, file) = temp_file(b"harmless content");

        let verdict = backend(addr, sink.clone()).scan(&file).await;
        assert_eq!(verdict, ScanVerdict::Clean);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_scan_infected_captures_name() {
        let addr = fake_daemon(vec!["stream: Eicar-Test-Signature FOUND"]).await;
        let sink = Arc::new(CollectingSink::new());
        let (_tmp, file) = temp_file(b"not actually eicar");

        let verdict = backend(addr, sink).scan(&file).await;
        assert!(verdict.is_infected());
        assert_eq!(verdict.virus_name(), Some("Eicar-Test-Signature"));
    }

    #[tokio::test]
    async fn test_scan_error_response_is_unchecked() {
        let addr = fake_daemon(vec!["stream: Access denied. ERROR"]).await;
        let sink = Arc::new(CollectingSink::new());
        let (_tmp, file) = temp_file(b"content");

        let verdict = backend(addr, sink).scan(&file).await;
        assert_eq!(verdict, ScanVerdict::Unchecked);
    }

    #[tokio::test]
    async fn test_connection_failure_is_unchecked_with_one_warning() {
        // Bind and immediately drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = Arc::new(CollectingSink::new());
        let (_tmp, file) = temp_file(b"content");

        let verdict = backend(addr, sink.clone()).scan(&file).await;
        assert_eq!(verdict, ScanVerdict::Unchecked);
        assert_eq!(sink.count_level(EventLevel::Warning), 1);
        assert_eq!(sink.len(), 1);

        // The warning carries the target address.
        let event = &sink.events()[0];
        assert_eq!(event.target.as_deref(), Some(addr.to_string().as_str()));
    }

    #[tokio::test]
    async fn test_scan_twice_is_idempotent() {
        let addr = fake_daemon(vec!["stream: OK", "stream: OK"]).await;
        let sink = Arc::new(CollectingSink::new());
        let (_tmp, file) = temp_file(b"stable content");

        let backend = backend(addr, sink);
        assert_eq!(backend.scan(&file).await, ScanVerdict::Clean);
        assert_eq!(backend.scan(&file).await, ScanVerdict::Clean);
    }

    #[tokio::test]
    async fn test_version_query() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut command = [0u8; 8];
            stream.read_exact(&mut command).await.unwrap();
            assert_eq!(&command, b"VERSION\n");
            stream.write_all(b"ClamAV 1.3.0/27000\n").await.unwrap();
        });

        let sink = Arc::new(CollectingSink::new());
        let version = backend(addr, sink).version().await;
        assert_eq!(version.as_deref(), Some("ClamAV 1.3.0/27000"));
    }

    #[tokio::test]
    async fn test_version_on_connection_failure_is_none() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = Arc::new(CollectingSink::new());
        let version = backend(addr, sink.clone()).version().await;
        assert_eq!(version, None);
        assert_eq!(sink.count_level(EventLevel::Warning), 1);
    }
}
