//! Scan verdict type.
//!
//! This module defines `ScanVerdict`, the tri-state outcome of a scan.
//! The virus name travels inside the `Infected` variant, so a verdict is
//! a single self-contained value: there is no shared "last virus name"
//! slot to race on when a backend is used from multiple tasks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome of a malware scan.
///
/// A scan produces exactly one verdict:
/// - `Unchecked`: the file could not be scanned (backend unreachable,
///   protocol failure, or an unrecognised daemon response).
/// - `Clean`: the file was scanned and no infection was found.
/// - `Infected`: the file was scanned and found to be infected.
///
/// # Examples
///
/// ```rust
/// use virusgate::core::ScanVerdict;
///
/// let verdict = ScanVerdict::infected("Eicar-Test-Signature");
/// assert!(verdict.is_infected());
/// assert_eq!(verdict.virus_name(), Some("Eicar-Test-Signature"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanVerdict {
    /// The file was not scanned; the scanning service may be unavailable.
    Unchecked,

    /// The file was scanned and no infection was found.
    Clean,

    /// The file was scanned and found to be infected.
    Infected {
        /// Name of the detected virus, when the backend reports one.
        ///
        /// Daemon backends always supply a name; the HTTP API backend
        /// does not surface one.
        #[serde(skip_serializing_if = "Option::is_none")]
        virus_name: Option<String>,
    },
}

impl ScanVerdict {
    /// Creates an `Infected` verdict carrying the given virus name.
    pub fn infected(virus_name: impl Into<String>) -> Self {
        Self::Infected {
            virus_name: Some(virus_name.into()),
        }
    }

    /// Returns `true` if the verdict is `Clean`.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }

    /// Returns `true` if the verdict is `Infected`.
    pub fn is_infected(&self) -> bool {
        matches!(self, Self::Infected { .. })
    }

    /// Returns `true` if the verdict is `Unchecked`.
    pub fn is_unchecked(&self) -> bool {
        matches!(self, Self::Unchecked)
    }

    /// Returns the detected virus name, if any.
    pub fn virus_name(&self) -> Option<&str> {
        match self {
            Self::Infected { virus_name } => virus_name.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for ScanVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchecked => write!(f, "unchecked"),
            Self::Clean => write!(f, "clean"),
            Self::Infected {
                virus_name: Some(name),
            } => write!(f, "infected ({name})"),
            Self::Infected { virus_name: None } => write!(f, "infected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_is_methods() {
        assert!(ScanVerdict::Clean.is_clean());
        assert!(!ScanVerdict::Clean.is_infected());
        assert!(ScanVerdict::Unchecked.is_unchecked());

        let infected = ScanVerdict::infected("Test.Malware");
        assert!(infected.is_infected());
        assert!(!infected.is_clean());
    }

    #[test]
    fn test_virus_name_only_on_infected() {
        assert_eq!(ScanVerdict::Clean.virus_name(), None);
        assert_eq!(ScanVerdict::Unchecked.virus_name(), None);
        assert_eq!(
            ScanVerdict::infected("Eicar-Test-Signature").virus_name(),
            Some("Eicar-Test-Signature")
        );
        assert_eq!(ScanVerdict::Infected { virus_name: None }.virus_name(), None);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(ScanVerdict::Clean.to_string(), "clean");
        assert_eq!(ScanVerdict::Unchecked.to_string(), "unchecked");
        assert_eq!(
            ScanVerdict::infected("Eicar-Test-Signature").to_string(),
            "infected (Eicar-Test-Signature)"
        );
    }

    #[test]
    fn test_verdict_serialization() {
        let json = serde_json::to_value(ScanVerdict::infected("Test")).unwrap();
        assert_eq!(json["type"], "infected");
        assert_eq!(json["virus_name"], "Test");

        let json = serde_json::to_value(ScanVerdict::Clean).unwrap();
        assert_eq!(json["type"], "clean");
    }
}
