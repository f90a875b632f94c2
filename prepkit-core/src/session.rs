//! The session object exported to hosts.

use std::sync::{Mutex, MutexGuard};

use prepkit_db::Connection;

use crate::cache::StatementCache;
use crate::config::SessionConfig;
use crate::error::{PrepError, PrepResult};
use crate::executor::{self, ExecOutcome};
use crate::query::{self, QueryOutcome};
use crate::reference::{PrepCommand, Reference};
use crate::serializer::RecordShape;
use crate::value::{to_engine_values, SqlValue};

/// An open database together with its statement cache.
///
/// Every method runs as one critical section, so a session may be shared
/// between host threads.
#[derive(uniffi::Object)]
pub struct Session {
    inner: Mutex<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

// Field order matters: cached statements are finalized before the
// connection closes.
struct SessionInner {
    cache: StatementCache,
    conn: Connection,
}

impl SessionInner {
    fn new(conn: Connection, capacity: usize) -> Self {
        Self {
            cache: StatementCache::new(capacity),
            conn,
        }
    }
}

#[uniffi::export]
impl Session {
    /// Opens the database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::Engine`] if the database cannot be opened.
    #[uniffi::constructor]
    #[allow(clippy::needless_pass_by_value)]
    pub fn open(config: SessionConfig) -> PrepResult<Self> {
        let conn = Connection::open(&config.path(), config.read_only)?;
        log::debug!(
            "opened {} (read_only={}, max_statements={})",
            config.db_path,
            config.read_only,
            config.max_statements
        );
        Ok(Self::from_inner(SessionInner::new(conn, config.capacity())))
    }

    /// Opens `./sqlite.db` with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::Engine`] if the database cannot be opened.
    #[uniffi::constructor]
    pub fn open_default() -> PrepResult<Self> {
        Self::open(SessionConfig::default())
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::Engine`] if the engine cannot allocate it.
    #[uniffi::constructor]
    pub fn open_in_memory() -> PrepResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_inner(SessionInner::new(
            conn,
            SessionConfig::default().capacity(),
        )))
    }

    /// Runs a mutating statement, referenced by handle or given as SQL.
    ///
    /// # Errors
    ///
    /// Lookup, argument count, compile and runtime errors.
    pub fn exec(&self, reference: &str, args: Vec<SqlValue>) -> PrepResult<ExecOutcome> {
        let args = to_engine_values(args);
        let mut inner = self.lock_inner()?;
        let SessionInner { cache, conn } = &mut *inner;
        executor::execute(conn, cache, Reference::resolve(reference), &args)
    }

    /// Runs a read statement and encodes up to `limit` rows (`0` for all),
    /// as objects when `as_map` is set and as arrays otherwise.
    ///
    /// # Errors
    ///
    /// Lookup, argument count and compile errors. Errors hit while stepping
    /// are reported in [`QueryOutcome::error`].
    pub fn query(
        &self,
        reference: &str,
        args: Vec<SqlValue>,
        as_map: bool,
        limit: i64,
    ) -> PrepResult<QueryOutcome> {
        let args = to_engine_values(args);
        let mut inner = self.lock_inner()?;
        let SessionInner { cache, conn } = &mut *inner;
        query::run(
            conn,
            cache,
            Reference::resolve(reference),
            &args,
            RecordShape::from_as_map(as_map),
            limit,
        )
    }

    /// Manages the statement cache.
    ///
    /// - `"clean_prep_cache"` closes every cached statement and returns `0`;
    /// - a handle closes that statement and returns `0`;
    /// - anything else is compiled, cached, and its new handle returned.
    ///
    /// # Errors
    ///
    /// [`PrepError::InvalidHandle`] when closing an unknown handle,
    /// [`PrepError::CacheFull`] and compile errors when preparing.
    pub fn prep(&self, reference_or_command: &str) -> PrepResult<u64> {
        let mut inner = self.lock_inner()?;
        let SessionInner { cache, conn } = &mut *inner;
        match PrepCommand::parse(reference_or_command) {
            PrepCommand::ClearAll => {
                cache.clear();
                Ok(0)
            }
            PrepCommand::Close(handle) => cache.close(handle).map(|()| 0),
            PrepCommand::Prepare(sql) => cache.prepare(conn, sql).map(|handle| handle.get()),
        }
    }

    /// Number of statements currently cached.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::Lock`] if the session mutex is poisoned.
    pub fn cached_statements(&self) -> PrepResult<u64> {
        Ok(self.lock_inner()?.cache.len() as u64)
    }
}

/// Implementation not exposed to foreign bindings
impl Session {
    fn from_inner(inner: SessionInner) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn lock_inner(&self) -> PrepResult<MutexGuard<'_, SessionInner>> {
        self.inner.lock().map_err(|_| PrepError::Lock)
    }
}
