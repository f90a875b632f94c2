//! Bounded cache of compiled statements keyed by numeric handle.
//!
//! Invariants:
//! - every key is non-zero and maps to a live (not finalized) statement;
//! - occupancy never exceeds the configured capacity;
//! - a handle is never handed out twice while it is still cached.
//!
//! There is no eviction. When the cache is full, `prepare` fails and the
//! caller must close statements or clear the cache.
//!
//! The cache is a single mutable resource. It is not internally
//! synchronized; `Session` keeps it behind the same mutex as the connection.

use std::collections::HashMap;

use prepkit_db::{Connection, Statement};

use crate::error::{PrepError, PrepResult};
use crate::reference::StatementHandle;

/// Default maximum number of cached statements.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Owns every statement compiled through `prep`.
#[derive(Debug)]
pub struct StatementCache {
    entries: HashMap<StatementHandle, Statement>,
    /// Last handle handed out. Pre-incremented, so the first handle is 2.
    last_handle: u64,
    capacity: usize,
}

impl StatementCache {
    /// Creates an empty cache holding at most `capacity` statements.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            last_handle: 1,
            capacity,
        }
    }

    /// Compiles `sql` against `conn` and caches it under a fresh handle.
    ///
    /// # Errors
    ///
    /// - [`PrepError::CacheFull`] if the cache is at capacity (nothing is
    ///   compiled and occupancy is unchanged);
    /// - [`PrepError::Engine`] with the engine's compile error.
    pub fn prepare(&mut self, conn: &Connection, sql: &str) -> PrepResult<StatementHandle> {
        if self.entries.len() >= self.capacity {
            return Err(PrepError::CacheFull {
                capacity: self.capacity as u64,
            });
        }
        let stmt = conn.prepare(sql)?;
        let handle = self.next_handle();
        self.entries.insert(handle, stmt);
        log::debug!("cached statement {handle} ({} in cache)", self.entries.len());
        Ok(handle)
    }

    /// Finalizes and removes the statement cached under `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidHandle`] if no such statement is cached.
    pub fn close(&mut self, handle: StatementHandle) -> PrepResult<()> {
        match self.entries.remove(&handle) {
            Some(_finalized_on_drop) => {
                log::debug!("closed statement {handle}");
                Ok(())
            }
            None => Err(PrepError::InvalidHandle),
        }
    }

    /// Finalizes and removes every cached statement. Always succeeds.
    pub fn clear(&mut self) {
        let closed = self.entries.len();
        self.entries.clear();
        log::debug!("cleared statement cache ({closed} closed)");
    }

    /// Looks up the statement cached under `handle`.
    pub fn get_mut(&mut self, handle: StatementHandle) -> Option<&mut Statement> {
        self.entries.get_mut(&handle)
    }

    /// Returns `true` if `handle` is cached.
    #[must_use]
    pub fn contains(&self, handle: StatementHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Number of cached statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached statements.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Advances the allocator: monotonic, wraps to 1 (never 0) on overflow,
    /// and skips handles that are still cached after a wrap.
    fn next_handle(&mut self) -> StatementHandle {
        loop {
            self.last_handle = self.last_handle.wrapping_add(1);
            if self.last_handle == 0 {
                self.last_handle = 1;
            }
            let handle = StatementHandle::new(self.last_handle);
            if !self.entries.contains_key(&handle) {
                return handle;
            }
        }
    }
}

impl Default for StatementCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
impl StatementCache {
    /// Positions the allocator so that the next handle is `last + 1`.
    pub(crate) fn set_last_handle(&mut self, last: u64) {
        self.last_handle = last;
    }
}
