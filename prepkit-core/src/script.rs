//! Raw SQL text run as a sequence of one-shot statements.
//!
//! Text passed to `exec` or `query` may hold several statements. They are
//! compiled one at a time, each right before it runs, so a statement may
//! refer to objects created by the ones before it. Positional arguments are
//! handed out in order: each statement takes as many as it declares
//! parameters, and together they must account for every argument.

use prepkit_db::{Connection, Statement, Value};

use crate::error::{PrepError, PrepResult};

pub(crate) struct Script<'c, 's, 'a> {
    conn: &'c Connection,
    rest: &'s str,
    args: &'a [Value],
    consumed: usize,
}

impl<'c, 's, 'a> Script<'c, 's, 'a> {
    pub(crate) const fn new(conn: &'c Connection, sql: &'s str, args: &'a [Value]) -> Self {
        Self {
            conn,
            rest: sql,
            args,
            consumed: 0,
        }
    }

    /// Compiles and binds the first statement.
    ///
    /// # Errors
    ///
    /// Fails like [`next_statement`](Self::next_statement), and with
    /// `empty statement` when the text holds none.
    pub(crate) fn first(&mut self) -> PrepResult<Statement> {
        self.next_statement()?
            .ok_or_else(|| PrepError::Engine("empty statement".to_string()))
    }

    /// Compiles and binds the next statement, or returns `None` once the
    /// text is exhausted.
    ///
    /// # Errors
    ///
    /// The engine's compile or bind error, or [`PrepError::ArgumentCount`]
    /// when the statements declare fewer or more parameters than there are
    /// arguments.
    pub(crate) fn next_statement(&mut self) -> PrepResult<Option<Statement>> {
        let (stmt, tail) = self.conn.prepare_leading(self.rest)?;
        self.rest = tail;
        let Some(mut stmt) = stmt else {
            self.finish()?;
            return Ok(None);
        };
        let end = self.consumed + stmt.parameter_count();
        let Some(args) = self.args.get(self.consumed..end) else {
            return Err(self.count_mismatch(end));
        };
        stmt.bind_values(args)?;
        self.consumed = end;
        Ok(Some(stmt))
    }

    /// Returns `true` if another statement follows the last one returned.
    pub(crate) fn has_more(&self) -> bool {
        self.conn.contains_statement(self.rest)
    }

    /// Checks that every argument was taken by some statement.
    ///
    /// # Errors
    ///
    /// [`PrepError::ArgumentCount`] if arguments are left over.
    pub(crate) fn finish(&self) -> PrepResult<()> {
        if self.consumed == self.args.len() {
            Ok(())
        } else {
            Err(self.count_mismatch(self.consumed))
        }
    }

    const fn count_mismatch(&self, expected: usize) -> PrepError {
        PrepError::ArgumentCount {
            expected: expected as u64,
            got: self.args.len() as u64,
        }
    }
}
