//! Scheme scannability rules and external hooks.

use crate::core::FileReference;

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

/// Classifies storage schemes as local or remote.
///
/// Implemented by the host application, which knows which logical
/// storage backends exist and where they live.
pub trait SchemeClassifier: Send + Sync + Debug {
    /// Returns `true` if the scheme stores files on local disk.
    fn is_local(&self, scheme: &str) -> bool;

    /// Returns every scheme the host environment knows about.
    fn known_schemes(&self) -> Vec<String>;
}

/// A fixed scheme classification, for hosts with a static storage layout
/// and for tests.
///
/// # Examples
///
/// ```rust
/// use virusgate::policy::{SchemeClassifier, StaticSchemeClassifier};
///
/// let classifier = StaticSchemeClassifier::new()
///     .with_local("public")
///     .with_remote("s3");
/// assert!(classifier.is_local("public"));
/// assert!(!classifier.is_local("s3"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticSchemeClassifier {
    schemes: HashMap<String, bool>,
}

impl StaticSchemeClassifier {
    /// Creates an empty classifier.
    ///
    /// Unknown schemes are treated as remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a local scheme.
    pub fn with_local(mut self, scheme: impl Into<String>) -> Self {
        self.schemes.insert(scheme.into(), true);
        self
    }

    /// Registers a remote scheme.
    pub fn with_remote(mut self, scheme: impl Into<String>) -> Self {
        self.schemes.insert(scheme.into(), false);
        self
    }
}

impl SchemeClassifier for StaticSchemeClassifier {
    fn is_local(&self, scheme: &str) -> bool {
        self.schemes.get(scheme).copied().unwrap_or(false)
    }

    fn known_schemes(&self) -> Vec<String> {
        self.schemes.keys().cloned().collect()
    }
}

/// A hook's answer to "should this file be scanned?".
///
/// Hooks that do not want to affect the result return `NoOpinion`; the
/// last non-`NoOpinion` answer overrides the policy-computed default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOpinion {
    /// The file should be scanned.
    Scannable,
    /// The file should not be scanned.
    NotScannable,
    /// Defer to the policy default and other hooks.
    NoOpinion,
}

/// An externally registered scannability veto/override.
///
/// Typical uses: skipping image files, skipping very large files, or
/// trusting uploads from administrators.
pub trait ScannabilityHook: Send + Sync + Debug {
    /// Returns this hook's opinion on the given file.
    fn opinion(&self, file: &FileReference) -> ScanOpinion;
}

/// Per-scheme scannability rules.
///
/// A scheme's default is "scannable iff local"; schemes in the override
/// set have that default flipped. The two combine as exclusive-or, so an
/// overridden local scheme becomes non-scannable and an overridden
/// remote scheme becomes scannable. Overriding a scheme twice is
/// idempotent because the override set is set membership, not a toggle
/// counter.
#[derive(Debug)]
pub struct ScannabilityPolicy {
    classifier: Arc<dyn SchemeClassifier>,
    overridden_schemes: HashSet<String>,
}

impl ScannabilityPolicy {
    /// Creates a policy from a classifier and the configured override set.
    pub fn new(classifier: Arc<dyn SchemeClassifier>, overridden_schemes: HashSet<String>) -> Self {
        Self {
            classifier,
            overridden_schemes,
        }
    }

    /// Determines whether files of the given scheme should be scanned.
    ///
    /// Files with no scheme (plain paths) are always scannable.
    pub fn is_scheme_scannable(&self, scheme: Option<&str>) -> bool {
        let Some(scheme) = scheme.filter(|s| !s.is_empty()) else {
            return true;
        };

        let scheme_is_local = self.classifier.is_local(scheme);
        let scheme_is_overridden = self.overridden_schemes.contains(scheme);

        scheme_is_local ^ scheme_is_overridden
    }
}
