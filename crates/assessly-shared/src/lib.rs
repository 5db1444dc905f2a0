//! # Assessly Shared
//!
//! Configuration, telemetry, and common types shared by every Assessly crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use error::AppError;
pub use types::*;
