//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analysis;
pub mod health;
pub mod rules;

// Re-export all handlers for use in router
pub use analysis::*;
pub use health::*;
pub use rules::*;

use axum::extract::rejection::JsonRejection;

use crate::AppError;

/// Malformed JSON bodies get the same error shape as rejected values
pub(crate) fn rejected(rejection: JsonRejection) -> AppError {
    AppError::bad_request(&rejection.body_text())
}
