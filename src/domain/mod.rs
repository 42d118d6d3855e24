//! # Domain Layer
//!
//! Core models for listings and matching, plus the shared error type.
//! This layer is independent of external frameworks and infrastructure.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
