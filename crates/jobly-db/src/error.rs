//! Error types for jobly-db

use thiserror::Error;

/// Result type alias for jobly-db operations
pub type JoblyResult<T> = Result<T, JoblyError>;

/// Outward classification of a [`JoblyError`].
///
/// Callers (an HTTP layer, a CLI) map these to their own status signal; every error
/// kind lands in exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something we refuse to run.
    BadRequest,
    /// The addressed record does not exist.
    NotFound,
    /// Storage, decoding or configuration failure.
    Internal,
}

impl ErrorKind {
    /// Conventional HTTP status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

/// Error types for builder and repository operations
#[derive(Debug, Error)]
pub enum JoblyError {
    /// Update or filter input is not a proper field mapping
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Update called with zero fields
    #[error("No data")]
    EmptyUpdate,

    /// Filter criteria contain a key outside the allow-list
    #[error("Unsupported filter '{key}': only {} allowed", .allowed.join(", "))]
    UnsupportedFilter {
        key: String,
        allowed: Vec<&'static str>,
    },

    /// Minimum bound exceeds maximum bound
    #[error("{min_key} ({min}) must not exceed {max_key} ({max})")]
    Range {
        min_key: &'static str,
        max_key: &'static str,
        min: i64,
        max: i64,
    },

    /// Entity-level domain rule violated
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness violated on create
    #[error("Duplicate {0}")]
    Duplicate(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation reported by the database
    #[error("Unique constraint violation on {constraint}: {message}")]
    UniqueViolation { constraint: String, message: String },

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl JoblyError {
    /// Create an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a duplicate error
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate(message.into())
    }

    /// Outward classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_)
            | Self::EmptyUpdate
            | Self::UnsupportedFilter { .. }
            | Self::Range { .. }
            | Self::Validation(_)
            | Self::Duplicate(_) => ErrorKind::BadRequest,
            Self::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    /// Check if this error was caused by the caller's input
    pub fn is_bad_request(&self) -> bool {
        self.kind() == ErrorKind::BadRequest
    }

    /// Parse a tokio_postgres error into a more specific JoblyError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error()
            && db_err.code().code() == "23505"
        {
            return Self::UniqueViolation {
                constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                message: db_err.message().to_string(),
            };
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for JoblyError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
