//! Repository error types
//!
//! Every repository operation fails with a [`RepositoryError`] whose
//! [`RepositoryErrorKind`] tells the caller what to do next: report a missing
//! record, retry a read-modify-write cycle, show field errors, or treat the
//! failure as a store problem.
//!
//! # Example
//!
//! ```rust
//! use arena_data::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("Character", 42);
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert_eq!(error.entity_id.as_deref(), Some("42"));
//! ```

use std::fmt;
use std::time::Duration;

use crate::validator::ValidationErrors;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Inserting a new record
    Insert,
    /// Fetching a single record by id
    Get,
    /// Replacing the mutable fields of an existing record
    Update,
    /// Deleting a record by id
    Delete,
    /// Filtered, paginated listing
    List,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Get => write!(f, "get"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::List => write!(f, "list"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Record is absent, or the id can never exist (id < 1)
    NotFound,
    /// The record vanished between the caller's read and this update
    EditConflict,
    /// Structural or domain validation failed before touching the store
    ValidationFailed,
    /// Database constraint violation
    ConstraintViolation,
    /// Failed to reach the database
    ConnectionFailed,
    /// The per-call deadline elapsed, or no pooled connection became available in time
    Timeout,
    /// Any other store failure
    DatabaseError,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::EditConflict => write!(f, "edit_conflict"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DatabaseError => write!(f, "database_error"),
        }
    }
}

/// Structured repository error with operation context
///
/// # Example
///
/// ```rust
/// use arena_data::repository::{RepositoryError, RepositoryOperation};
///
/// let error = RepositoryError::edit_conflict("Player", 7);
/// assert!(error.is_edit_conflict());
/// assert_eq!(error.operation, RepositoryOperation::Update);
/// println!("{}", error); // "Repository edit_conflict error during update: ... [Player: 7]"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of record involved (e.g., "Character")
    pub entity_type: Option<String>,
    /// The id of the record involved
    pub entity_id: Option<String>,
    /// Field-keyed messages, populated for `ValidationFailed`
    pub field_errors: ValidationErrors,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
            field_errors: ValidationErrors::default(),
        }
    }

    /// Create a "not found" error with record context
    ///
    /// The operation defaults to [`RepositoryOperation::Get`]; use
    /// [`with_operation`](Self::with_operation) for deletes.
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl fmt::Display) -> Self {
        Self::new(
            RepositoryOperation::Get,
            RepositoryErrorKind::NotFound,
            "record not found",
        )
        .with_entity(entity_type, entity_id.to_string())
    }

    /// Create an edit conflict error for an update that matched no row
    pub fn edit_conflict(entity_type: impl Into<String>, entity_id: impl fmt::Display) -> Self {
        Self::new(
            RepositoryOperation::Update,
            RepositoryErrorKind::EditConflict,
            "unable to update the record due to an edit conflict, please try again",
        )
        .with_entity(entity_type, entity_id.to_string())
    }

    /// Create a validation failed error carrying field errors
    pub fn validation_failed(operation: RepositoryOperation, errors: ValidationErrors) -> Self {
        let mut error = Self::new(
            operation,
            RepositoryErrorKind::ValidationFailed,
            format!("validation failed: {}", errors),
        );
        error.field_errors = errors;
        error
    }

    /// Create a constraint violation error
    pub fn constraint_violation(
        operation: RepositoryOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(operation, RepositoryErrorKind::ConstraintViolation, message)
    }

    /// Create a connection failed error
    pub fn connection_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ConnectionFailed, message)
    }

    /// Create a timeout error for a call that exceeded its deadline
    pub fn timeout(operation: RepositoryOperation, deadline: Duration) -> Self {
        Self::new(
            operation,
            RepositoryErrorKind::Timeout,
            format!("store call exceeded its {:?} deadline", deadline),
        )
    }

    /// Create a generic database error
    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// Add record context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Add only the record type to an existing error
    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RepositoryErrorKind::NotFound
    }

    pub fn is_edit_conflict(&self) -> bool {
        self.kind == RepositoryErrorKind::EditConflict
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == RepositoryErrorKind::Timeout
    }

    /// Check if this error is a transient store failure
    ///
    /// Idempotent reads may be retried as-is. An edit conflict is not retriable
    /// in this sense: the caller must redo the whole read-modify-write cycle.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        match (&self.entity_type, &self.entity_id) {
            (Some(entity_type), Some(entity_id)) => write!(f, " [{}: {}]", entity_type, entity_id)?,
            (Some(entity_type), None) => write!(f, " [{}]", entity_type)?,
            _ => {}
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

// Conversion from sqlx::Error; callers overwrite the operation with `with_operation`
#[cfg(feature = "database")]
impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::Error as E;

        let op = RepositoryOperation::Get;
        match err {
            E::RowNotFound => Self::new(op, RepositoryErrorKind::NotFound, "record not found"),
            E::PoolTimedOut => Self::new(
                op,
                RepositoryErrorKind::Timeout,
                "timed out waiting for a pooled connection",
            ),
            E::PoolClosed => Self::connection_failed(op, "connection pool is closed"),
            E::WorkerCrashed => Self::connection_failed(op, "database worker crashed"),
            E::Io(e) => Self::connection_failed(op, e.to_string()),
            E::Tls(e) => Self::connection_failed(op, format!("TLS error: {}", e)),
            E::ColumnNotFound(col) => {
                Self::database_error(op, format!("column not found: {}", col))
            }
            E::ColumnDecode { index, source } => Self::database_error(
                op,
                format!("failed to decode column {}: {}", index, source),
            ),
            E::Database(db_err) => {
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation()
                {
                    Self::constraint_violation(op, db_err.to_string())
                } else if db_err.code().as_deref() == Some("57014") {
                    // query_canceled: statement_timeout fired on the server
                    Self::new(op, RepositoryErrorKind::Timeout, db_err.to_string())
                } else {
                    Self::database_error(op, db_err.to_string())
                }
            }
            other => Self::database_error(op, other.to_string()),
        }
    }
}
