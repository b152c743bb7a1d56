//! Structured logging for the StudyLens client.
//!
//! Wraps `tracing` to provide console output, optional NDJSON file
//! rotation, and environment-based level control.

pub mod logger;

pub use logger::init_logger;
