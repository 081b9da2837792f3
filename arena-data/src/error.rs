//! Crate-level error type
//!
//! Repository operations return the structured
//! [`RepositoryError`](crate::repository::RepositoryError) directly. [`Error`]
//! covers everything around them (configuration, pool bootstrap, migrations)
//! and wraps repository errors so startup code can use a single `?`.

use thiserror::Error;

use crate::repository::RepositoryError;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside individual repository calls
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Could not establish a working connection pool
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Schema migration failed
    #[cfg(feature = "database")]
    #[error("Migration error: {0}")]
    Migration(Box<sqlx::migrate::MigrateError>),

    /// Repository operation failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Error::Migration(Box::new(err))
    }
}

impl Error {
    /// The wrapped repository error, if this is one
    pub fn as_repository(&self) -> Option<&RepositoryError> {
        match self {
            Error::Repository(err) => Some(err),
            _ => None,
        }
    }
}
