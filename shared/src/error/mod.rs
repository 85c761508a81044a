//! Unified error handling
//!
//! All user-facing failures are expressed as [`AppError`] values carrying
//! a numeric [`ErrorCode`]. Codes are grouped into [`ErrorCategory`]
//! ranges so callers can branch on the kind of failure (validation,
//! permission, partial write, session) without string matching.

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::ErrorCode;
pub use types::{AppError, AppResult};
