//! Scan event types and sinks.

use crate::core::FileReference;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Mutex;

/// Severity of a scan event.
///
/// `Notice` sits between `Info` and `Warning`; it is used when an
/// unchecked file is allowed through, which is worth surfacing even in
/// non-verbose operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    /// Routine detail, emitted in verbose mode.
    Info,
    /// Noteworthy but expected under the configured policy.
    Notice,
    /// A scan could not be completed.
    Warning,
    /// An infection was detected.
    Error,
}

/// A structured event describing something that happened during a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanEvent {
    /// Unique event identifier, for correlation in downstream sinks.
    pub id: String,

    /// When the event was created.
    pub timestamp: DateTime<Utc>,

    /// Event severity.
    pub level: EventLevel,

    /// Human-readable message.
    pub message: String,

    /// Logical URI of the file involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_uri: Option<String>,

    /// Name of the detected virus, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virus_name: Option<String>,

    /// Backend target address (`host:port`, socket path, or endpoint URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Name of the backend that produced the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl ScanEvent {
    /// Creates a new event with the given level and message.
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            message: message.into(),
            file_uri: None,
            virus_name: None,
            target: None,
            backend: None,
        }
    }

    /// Attaches the file the event is about.
    pub fn with_file(mut self, file: &FileReference) -> Self {
        self.file_uri = Some(file.uri().to_string());
        self
    }

    /// Attaches a detected virus name.
    pub fn with_virus_name(mut self, name: impl Into<String>) -> Self {
        self.virus_name = Some(name.into());
        self
    }

    /// Attaches the backend target address.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Attaches the backend name.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }
}

/// Destination for scan events.
///
/// Implementations must not panic; a sink failure must never influence
/// the verdict returned to the caller.
pub trait EventSink: Send + Sync + Debug {
    /// Delivers one event.
    fn emit(&self, event: &ScanEvent);
}

/// Default sink forwarding events to `tracing`.
///
/// `Notice` has no direct `tracing` counterpart and is mapped to `info`
/// with the original level carried as a field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ScanEvent) {
        match event.level {
            EventLevel::Error => tracing::error!(
                target: "virusgate::audit",
                event_id = %event.id,
                file = ?event.file_uri,
                virus = ?event.virus_name,
                backend = ?event.backend,
                "{}",
                event.message
            ),
            EventLevel::Warning => tracing::warn!(
                target: "virusgate::audit",
                event_id = %event.id,
                file = ?event.file_uri,
                scan_target = ?event.target,
                backend = ?event.backend,
                "{}",
                event.message
            ),
            EventLevel::Notice | EventLevel::Info => tracing::info!(
                target: "virusgate::audit",
                event_id = %event.id,
                level = ?event.level,
                file = ?event.file_uri,
                backend = ?event.backend,
                "{}",
                event.message
            ),
        }
    }
}

/// A sink that retains every event it receives.
///
/// Intended for tests and for hosts that want to inspect the events a
/// scan produced after the fact.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ScanEvent>>,
}

impl CollectingSink {
    /// Creates an empty collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all collected events.
    pub fn events(&self) -> Vec<ScanEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Returns how many events of the given level were collected.
    pub fn count_level(&self, level: EventLevel) -> usize {
        self.events()
            .iter()
            .filter(|e| e.level == level)
            .count()
    }

    /// Returns the total number of collected events.
    pub fn len(&self) -> usize {
        self.events().len()
    }

    /// Returns `true` if no events were collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &ScanEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
