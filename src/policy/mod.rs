//! Scannability policy.
//!
//! Decides whether files under a given storage scheme should be scanned
//! at all. Local schemes are scannable by default, remote schemes are
//! not, and the configuration can flip the default per scheme. External
//! hooks registered with the scanner get the final word.

mod scannability;

pub use scannability::{
    ScanOpinion, ScannabilityHook, ScannabilityPolicy, SchemeClassifier, StaticSchemeClassifier,
};
