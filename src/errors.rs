//! Unified error type for the expense manager.
//!
//! Every core operation returns [`Result`]. The HTTP and page layers never
//! inspect variants directly; they classify an error through [`Error::kind`]
//! and map the resulting [`ErrorKind`] to a response.

use crate::core::validation::FieldError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors produced by configuration, storage, validation and authentication.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any storage failure that is not a constraint violation
    #[error("Database error: {0}")]
    Database(DbErr),

    /// A request payload failed field validation
    #[error("Validation error: {} field(s) rejected", fields.len())]
    Validation {
        /// Per-field messages, ordered by field name
        fields: Vec<FieldError>,
    },

    /// No record matched the identifier (and owner, where scoped)
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource kind, e.g. `"expense"`
        resource: &'static str,
        /// The identifier that was looked up
        id: String,
    },

    /// The operation would violate a uniqueness or reference rule
    #[error("{message}")]
    Conflict {
        /// Human-readable reason, safe to return to clients
        message: String,
    },

    /// No session, an expired session, or bad credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Password hashing or verification failed for a reason other than a mismatch
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Error reported by the hasher
        message: String,
    },

    /// I/O failure, e.g. binding the listener
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable was unreadable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Writing rendered output failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Classification of an [`Error`] for response mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401
    Unauthorized,
    /// 400 with field details
    Validation,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 500, details are never exposed
    Internal,
}

impl Error {
    /// Returns the response class this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Config { .. }
            | Self::Database(_)
            | Self::PasswordHash { .. }
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Fmt(_) => ErrorKind::Internal,
        }
    }

    /// Builds a single-field validation error.
    pub fn invalid_field(field: &str, message: &str) -> Self {
        Self::Validation {
            fields: vec![FieldError::new(field, message)],
        }
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!("Unique constraint violated: {detail}");
                Self::Conflict {
                    message: "A record with the same unique value already exists".to_string(),
                }
            }
            _ => Self::Database(err),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation {
            fields: crate::core::validation::collect_field_errors(&errors),
        }
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::PasswordHash {
            message: err.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
