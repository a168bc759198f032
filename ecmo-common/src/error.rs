//! Common error types for the ECMO directory

use thiserror::Error;

/// Common result type for directory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the directory crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Write rejected by a uniqueness or reference constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify a sqlx error, turning constraint violations into `Conflict`
    pub fn from_db(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Error::Conflict(format!("duplicate value: {}", db_err.message()));
            }
            if db_err.is_foreign_key_violation() {
                return Error::Conflict(format!("record is referenced or missing: {}", db_err.message()));
            }
        }
        Error::Database(err)
    }
}
