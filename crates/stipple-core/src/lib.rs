//! Stipple Core
//!
//! Shared plumbing for the Stipple crates: logging setup, profiling scopes,
//! hashed collections and math re-exports.

pub mod alloc;
pub mod logging;
pub mod math;
pub mod profiling;
