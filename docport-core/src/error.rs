//! Error types and result types for database operations.
//!
//! This module provides the error taxonomy shared by every backend.
//! Use [`DatabaseResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use thiserror::Error;

/// A boxed, thread-safe error used as the source of wrapped driver failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Represents all possible errors that can occur when interacting with a database.
///
/// Driver errors are never swallowed: they are kept as the `source` of the
/// variant that wraps them, so callers can inspect or downcast the original.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The connection could not be established after exhausting the retry budget.
    #[error("unable to connect to hosts {addrs:?} after {attempts} attempt(s): {source}")]
    Connection {
        /// The configured host addresses.
        addrs: Vec<String>,
        /// How many dial attempts were made.
        attempts: u32,
        /// The error returned by the final attempt.
        #[source]
        source: BoxError,
    },
    /// The connection configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// No document matched an operation that requires one.
    /// The argument is the collection name.
    #[error("Document not found in collection {0}")]
    NotFound(String),
    /// The driver reported a network or server selection timeout.
    #[error("Operation timed out: {0}")]
    Timeout(#[source] BoxError),
    /// A single data operation failed in the underlying driver.
    #[error("Operation error: {0}")]
    Operation(#[source] BoxError),
    /// An index could not be created.
    #[error("could not create index for {key:?}: {source}")]
    Index {
        /// The key of the index that failed.
        key: Vec<String>,
        #[source]
        source: Box<DatabaseError>,
    },
    /// Serialization/deserialization error when converting typed values to BSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DatabaseError {
    /// Wraps a driver failure as an [`DatabaseError::Operation`].
    pub fn operation<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        DatabaseError::Operation(err.into())
    }

    /// Returns `true` if this error reports that no document matched.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Returns `true` if this error reports a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DatabaseError::Timeout(_))
    }
}

/// A specialized `Result` type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

impl From<BsonError> for DatabaseError {
    fn from(err: BsonError) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}
