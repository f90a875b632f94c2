//! Errors reported by the engine wrapper.

use thiserror::Error;

/// Result type for engine calls.
pub type DbResult<T> = Result<T, DbError>;

/// Primary or extended `SQLite` result code attached to a [`DbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DbErrorCode(pub i32);

/// A failure reported by the engine or rejected before reaching it.
///
/// `message` is the engine's own text whenever the engine produced one, and
/// is also what `Display` prints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DbError {
    /// Result code of the failed call.
    pub code: DbErrorCode,
    /// Engine error text.
    pub message: String,
}

impl DbError {
    pub(crate) fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: DbErrorCode(code),
            message: message.into(),
        }
    }
}
