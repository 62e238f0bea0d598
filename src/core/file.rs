//! File reference abstraction.
//!
//! The host application owns its file entities; this crate only needs a
//! logical URI, the byte size, a resolvable filesystem path, and the
//! logical storage scheme the file lives under. `FileReference` carries
//! exactly that and is never mutated or deleted by the scanner.

use std::path::{Path, PathBuf};

/// A reference to a file that may be scanned.
///
/// # Examples
///
/// ```rust
/// use virusgate::core::FileReference;
///
/// let file = FileReference::new("public://uploads/report.pdf", "/srv/files/report.pdf", 4096);
/// assert_eq!(file.scheme(), Some("public"));
/// assert_eq!(file.size(), 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    /// Logical URI of the file, e.g. `public://uploads/report.pdf`.
    uri: String,

    /// Resolved filesystem path the file bytes can be read from.
    path: PathBuf,

    /// File size in bytes.
    size: u64,

    /// Explicit storage scheme, overriding the one derived from the URI.
    scheme: Option<String>,
}

impl FileReference {
    /// Creates a new file reference.
    pub fn new(uri: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            uri: uri.into(),
            path: path.into(),
            size,
            scheme: None,
        }
    }

    /// Creates a file reference from a plain filesystem path.
    ///
    /// The path doubles as the logical URI and the size is taken from
    /// filesystem metadata.
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let size = std::fs::metadata(&path)?.len();
        Ok(Self {
            uri: path.display().to_string(),
            path,
            size,
            scheme: None,
        })
    }

    /// Sets an explicit storage scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Returns the logical URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the filesystem path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the storage scheme this file lives under.
    ///
    /// An explicitly set scheme wins; otherwise the scheme is derived
    /// from the URI (`public://...` yields `public`). Plain paths have
    /// no scheme.
    pub fn scheme(&self) -> Option<&str> {
        if let Some(scheme) = &self.scheme {
            return Some(scheme);
        }
        self.uri.split_once("://").map(|(scheme, _)| scheme)
    }

    /// Returns the file name component of the path, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}
