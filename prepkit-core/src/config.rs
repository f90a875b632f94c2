//! Session configuration.

use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_CAPACITY;

/// Database file used when the host does not name one.
pub const DEFAULT_DB_PATH: &str = "./sqlite.db";

/// How a [`Session`](crate::Session) opens its database.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct SessionConfig {
    /// Path of the database file. Created if missing unless `read_only`.
    pub db_path: String,
    /// Opens the database without write access.
    pub read_only: bool,
    /// Maximum number of statements the cache holds at once. Values above
    /// [`DEFAULT_CAPACITY`] are capped to it.
    pub max_statements: u64,
}

impl SessionConfig {
    /// Default configuration for the database at `path`.
    #[must_use]
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            db_path: path.as_ref().to_string_lossy().into_owned(),
            ..Self::default()
        }
    }

    /// Returns the database path.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.db_path)
    }

    /// Cache capacity, never more than [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn capacity(&self) -> usize {
        usize::try_from(self.max_statements).map_or(DEFAULT_CAPACITY, |n| n.min(DEFAULT_CAPACITY))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            read_only: false,
            max_statements: DEFAULT_CAPACITY as u64,
        }
    }
}
