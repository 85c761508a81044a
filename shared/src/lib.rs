//! Shared types for the Mix storefront
//!
//! Domain models and error types used by both the backend client crate
//! and the orchestration layer. This crate performs no I/O.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
