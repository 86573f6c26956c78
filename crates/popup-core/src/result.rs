//! Convenience result type alias for the popup notifier.

use crate::error::AppError;

/// A specialized `Result` type for service-boundary operations.
pub type AppResult<T> = Result<T, AppError>;
