//! Execution of read statements with per-row encoding and row limiting.

use serde::Serialize;

use prepkit_db::{Connection, Statement, StepResult, Value};

use crate::bound::CachedStatement;
use crate::cache::StatementCache;
use crate::error::{PrepError, PrepResult};
use crate::executor::drain;
use crate::reference::Reference;
use crate::script::Script;
use crate::serializer::{encode_row, RecordShape};

/// Records collected by a query, plus the error that stopped row iteration
/// early, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, uniffi::Record)]
pub struct QueryOutcome {
    /// One encoded record per row, in engine iteration order.
    pub records: Vec<String>,
    /// Engine error raised while stepping through rows. The records collected
    /// before it are still returned.
    pub error: Option<String>,
}

impl QueryOutcome {
    /// Returns `true` if iteration ended without an engine error.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs the statement `reference` designates and encodes its rows.
///
/// `limit` caps the number of returned records; `0` (or any negative value)
/// means no cap. A row that fails to encode is dropped and does not count
/// against the limit.
///
/// Raw text holding several statements runs them in order, sharing out
/// `args`; every statement but the last is stepped to completion and the
/// rows returned are those of the last one.
///
/// # Errors
///
/// Lookup, argument count, compile and bind errors fail the call, as do
/// errors raised by the statements before the last. Errors raised while
/// stepping through the returned rows are reported in
/// [`QueryOutcome::error`] instead.
pub fn run(
    conn: &Connection,
    cache: &mut StatementCache,
    reference: Reference<'_>,
    args: &[Value],
    shape: RecordShape,
    limit: i64,
) -> PrepResult<QueryOutcome> {
    match reference {
        Reference::Handle(handle) => {
            let mut stmt = CachedStatement::bind(cache, handle, args)?;
            Ok(collect(&mut stmt, shape, limit))
        }
        Reference::RawText(sql) => {
            let mut script = Script::new(conn, sql, args);
            let mut stmt = script.first()?;
            while script.has_more() {
                drain(&mut stmt)?;
                match script.next_statement()? {
                    Some(next) => stmt = next,
                    None => return Ok(QueryOutcome::default()),
                }
            }
            script.finish()?;
            Ok(collect(&mut stmt, shape, limit))
        }
    }
}

fn collect(stmt: &mut Statement, shape: RecordShape, limit: i64) -> QueryOutcome {
    let columns = stmt.column_names();
    let mut records = Vec::new();

    // Only ever decremented, so a limit of 0 goes negative and never stops.
    let mut remaining = limit;
    let error = loop {
        match stmt.step() {
            Ok(StepResult::Row) => {}
            Ok(StepResult::Done) => break None,
            Err(err) => break Some(PrepError::from(err).to_string()),
        }
        match encode_row(&columns, &stmt.row_values(), shape) {
            Ok(record) => records.push(record),
            Err(err) => {
                log::debug!("dropping {shape} record: {err}");
                continue;
            }
        }
        remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            break None;
        }
    };
    QueryOutcome { records, error }
}
