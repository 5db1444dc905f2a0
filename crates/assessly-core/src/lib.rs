//! # Assessly Core
//!
//! Domain entities, repository traits (ports), and services for the Assessly
//! assessment and reporting platform.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

pub use domain::*;
pub use error::DomainError;
