use thiserror::Error;

/// Errors that can occur when interacting with storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The storage backend cannot be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A row held a value the application cannot represent.
    #[error("Invalid stored value in {column}: {value}")]
    InvalidValue { column: &'static str, value: String },
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
