//! HTTP transport client for the StudyLens backend.
//!
//! Single point of contact with the API: request building, bearer auth,
//! and error normalization all live here. Callers get typed responses or a
//! [`studylens_core::LensError`]; nothing above this crate touches HTTP.

pub mod client;
pub mod envelope;
pub mod token;

pub use client::ApiClient;
pub use envelope::{CompactData, CompactProcessResponse};
pub use token::{NoAuth, StaticToken, TokenProvider};
