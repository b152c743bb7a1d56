//! Processing lifecycle for the StudyLens client.
//!
//! One controller drives one processing attempt at a time from "file
//! selected" to a terminal state, published through a watch channel so
//! drivers (the CLI, the proxy) can render every transition.

pub mod controller;

pub use controller::{ProcessingController, ProcessingState};
