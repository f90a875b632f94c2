//! Cached statements borrowed for a single call.

use std::ops::{Deref, DerefMut};

use prepkit_db::{Statement, Value};

use crate::cache::StatementCache;
use crate::error::{PrepError, PrepResult};
use crate::reference::StatementHandle;

/// A cached statement with the caller's arguments bound.
///
/// Dropping it rewinds the statement (cursor released, bindings cleared) so
/// the next call starts fresh, including after an early stop or an error.
#[derive(Debug)]
pub(crate) struct CachedStatement<'c>(&'c mut Statement);

impl<'c> CachedStatement<'c> {
    /// Looks up `handle` and binds `args` positionally.
    ///
    /// # Errors
    ///
    /// - [`PrepError::NoSuchStatement`] for a handle that is not cached (no
    ///   fallback to literal SQL);
    /// - [`PrepError::ArgumentCount`] when `args` does not match the
    ///   statement's parameters;
    /// - [`PrepError::Engine`] for bind failures.
    pub(crate) fn bind(
        cache: &'c mut StatementCache,
        handle: StatementHandle,
        args: &[Value],
    ) -> PrepResult<Self> {
        let mut bound = Self(cache.get_mut(handle).ok_or(PrepError::NoSuchStatement)?);
        let expected = bound.parameter_count();
        if expected != args.len() {
            return Err(PrepError::ArgumentCount {
                expected: expected as u64,
                got: args.len() as u64,
            });
        }
        bound.bind_values(args)?;
        Ok(bound)
    }
}

impl Deref for CachedStatement<'_> {
    type Target = Statement;

    fn deref(&self) -> &Statement {
        &*self.0
    }
}

impl DerefMut for CachedStatement<'_> {
    fn deref_mut(&mut self) -> &mut Statement {
        &mut *self.0
    }
}

impl Drop for CachedStatement<'_> {
    fn drop(&mut self) {
        self.0.rewind();
    }
}
