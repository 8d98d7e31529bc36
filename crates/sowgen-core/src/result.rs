//! Convenience result type alias for SOWgen.

use crate::error::AppError;

/// A specialized `Result` type for SOWgen operations.
pub type AppResult<T> = Result<T, AppError>;
