//! Mock backend for testing.

use crate::backends::Engine;
use crate::core::{FileReference, ScanVerdict};

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// A configurable stub backend.
///
/// Returns a fixed verdict and counts invocations, which lets tests
/// assert both what a facade reports and whether the backend was
/// contacted at all (zero-byte files must never reach it).
///
/// # Examples
///
/// ```rust
/// use virusgate::backends::MockBackend;
/// use virusgate::core::ScanVerdict;
///
/// let backend = MockBackend::new(ScanVerdict::infected("Test.Malware"));
/// assert_eq!(backend.scan_count(), 0);
/// ```
#[derive(Debug)]
pub struct MockBackend {
    verdict: ScanVerdict,
    version: Option<String>,
    scan_count: AtomicU64,
}

impl MockBackend {
    /// Creates a mock backend returning the given verdict on every scan.
    pub fn new(verdict: ScanVerdict) -> Self {
        Self {
            verdict,
            version: Some("mock 0.0".to_string()),
            scan_count: AtomicU64::new(0),
        }
    }

    /// Creates a mock backend that reports every file clean.
    pub fn new_clean() -> Self {
        Self::new(ScanVerdict::Clean)
    }

    /// Sets the version string the backend reports.
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Returns the number of scans performed.
    pub fn scan_count(&self) -> u64 {
        self.scan_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Engine for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn scan(&self, _file: &FileReference) -> ScanVerdict {
        self.scan_count.fetch_add(1, Ordering::Relaxed);
        self.verdict.clone()
    }

    async fn version(&self) -> Option<String> {
        self.version.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_configured_verdict() {
        let backend = MockBackend::new(ScanVerdict::infected("Test.Malware"));
        let file = FileReference::new("public://a", "/tmp/a", 1);

        let verdict = backend.scan(&file).await;
        assert_eq!(verdict.virus_name(), Some("Test.Malware"));
        assert_eq!(backend.scan_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_version() {
        let backend = MockBackend::new_clean().with_version(Some("fake 1.0".into()));
        assert_eq!(backend.version().await.as_deref(), Some("fake 1.0"));
    }
}
