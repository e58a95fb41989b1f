//! Common types and utilities shared across all crates

pub mod config;
pub mod error;
pub mod protocol;
pub mod telemetry;
pub mod types;

pub use config::*;
pub use error::{ConfhubError, Result};
pub use telemetry::*;
pub use types::*;
