use thiserror::Error;

/// Centralized error types for the core library
///
/// Storage failures (including constraint violations such as a duplicate
/// `telegram_id` or a missing foreign key) are passed through unchanged in
/// [`AppError::Database`]; the gateway never retries.
///
/// # Example
///
/// ```no_run
/// use postacore::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced row does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// True when the storage engine rejected the statement because of a
    /// UNIQUE / FOREIGN KEY / NOT NULL constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            AppError::Database(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
