use thiserror::Error;

use prepkit_db::DbError;

/// Result type for every prepkit operation.
pub type PrepResult<T> = Result<T, PrepError>;

/// Errors returned to the caller of a prepkit operation.
///
/// None of these are retried or logged internally.
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum PrepError {
    /// A numeric reference passed to `exec` or `query` is not in the cache.
    #[error("no such prepared statement index")]
    NoSuchStatement,
    /// A numeric reference passed to `prep` (close) is not in the cache.
    #[error("invalid prepared statement index")]
    InvalidHandle,
    /// The statement cache is full; the caller must clear it before retrying.
    #[error("too many prepared statements ({capacity}), use clean_prep_cache on prep to clean")]
    CacheFull {
        /// Configured cache capacity.
        capacity: u64,
    },
    /// The number of positional arguments does not match the statement.
    #[error("expected {expected} arguments, got {got}")]
    ArgumentCount {
        /// Parameters declared by the statement.
        expected: u64,
        /// Arguments supplied by the caller.
        got: u64,
    },
    /// Compile or runtime failure reported by the engine, verbatim.
    #[error("{0}")]
    Engine(String),
    /// The session mutex was poisoned by a panicking caller.
    #[error("session lock poisoned")]
    Lock,
}

impl From<DbError> for PrepError {
    fn from(err: DbError) -> Self {
        Self::Engine(err.message)
    }
}
