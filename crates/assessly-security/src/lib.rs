//! # Assessly Security
//!
//! Verification of Supabase-issued access tokens.

pub mod bearer;
pub mod jwt;

pub use bearer::extract_bearer;
pub use jwt::{Claims, JwtError, JwtService};
