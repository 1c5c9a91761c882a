//! Translation of driver errors.

use std::io;

use docport_core::error::DatabaseError;
use mongodb::error::{Error as MongoError, ErrorKind};

/// Wraps a driver error, classifying timeouts.
///
/// The driver error is kept as the source of the returned error.
pub(crate) fn driver_error(err: MongoError) -> DatabaseError {
    let timed_out = match err.kind.as_ref() {
        ErrorKind::Io(io_err) => io_err.kind() == io::ErrorKind::TimedOut,
        ErrorKind::ServerSelection { .. } => true,
        _ => false,
    };

    if timed_out {
        DatabaseError::Timeout(Box::new(err))
    } else {
        DatabaseError::Operation(Box::new(err))
    }
}

/// The error reported when a handle's session was already handed to a cursor.
pub(crate) fn session_released() -> DatabaseError {
    DatabaseError::operation("session already released")
}
