use thiserror::Error;

/// Errors surfaced by repository implementations
#[derive(Debug, Error, PartialEq)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    /// A unique constraint was violated; carries the constraint name
    #[error("Conflict on {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
