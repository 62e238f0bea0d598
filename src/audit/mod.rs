//! Structured scan events and the sink they are delivered to.
//!
//! The host application injects an [`EventSink`] at construction; there
//! is no global logger access. The default [`TracingSink`] forwards
//! events to `tracing`. Sinks are infallible by construction, so
//! emitting an event can never abort a scan.

mod events;

pub use events::{CollectingSink, EventLevel, EventSink, ScanEvent, TracingSink};
