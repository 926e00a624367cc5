//! Domain services for collections and ratings
//!
//! Services own the business rules (trimming, validation, existence checks,
//! cascade ordering) and return typed [`ServiceError`]s. Translation to HTTP
//! status codes happens only in the API layer.

mod collections;
mod ratings;

pub use collections::CollectionService;
pub use ratings::RatingService;

use rateshelf_common::validation::ValidationError;
use thiserror::Error;

/// Typed failure of a service operation
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or out-of-range input (400)
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Referenced entity does not exist (404)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness violation reported by the store (400)
    #[error("{0}")]
    Conflict(String),

    /// Store unreachable or unexpected failure (500)
    #[error("Database error: {0}")]
    Infrastructure(#[from] sqlx::Error),
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Map a store error, turning unique-constraint violations into conflicts
fn classify(err: sqlx::Error, conflict_message: &str) -> ServiceError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ServiceError::Conflict(conflict_message.to_string())
        }
        _ => ServiceError::Infrastructure(err),
    }
}
