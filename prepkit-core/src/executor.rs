//! Execution of mutating statements.

use serde::Serialize;

use prepkit_db::{Connection, Statement, StepResult, Value};

use crate::bound::CachedStatement;
use crate::cache::StatementCache;
use crate::error::PrepResult;
use crate::reference::Reference;
use crate::script::Script;

/// Metadata reported after a successful `exec`.
///
/// A field is `-1` when the engine has nothing meaningful to report for the
/// statement: read-only statements change no rows and generate no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, uniffi::Record)]
pub struct ExecOutcome {
    /// Rows inserted, updated or deleted by the most recently completed
    /// INSERT, UPDATE or DELETE on the connection. For other writing
    /// statements (DDL, for instance) that is an earlier statement.
    pub rows_affected: i64,
    /// Rowid of the most recent successful INSERT on the connection.
    pub last_insert_id: i64,
}

impl ExecOutcome {
    /// Sentinel used when neither field is available.
    pub const UNAVAILABLE: Self = Self {
        rows_affected: -1,
        last_insert_id: -1,
    };
}

/// Runs the statement `reference` designates with `args` bound positionally.
///
/// Handle references run the cached statement. Raw text is compiled for this
/// call only and never cached; when it holds several statements they run in
/// order, sharing out `args`, and the outcome is that of the last one. Every
/// statement is stepped to completion.
///
/// # Errors
///
/// Lookup, argument count, compile and runtime errors. With raw text, the
/// statements before a failing one have already run.
pub fn execute(
    conn: &Connection,
    cache: &mut StatementCache,
    reference: Reference<'_>,
    args: &[Value],
) -> PrepResult<ExecOutcome> {
    match reference {
        Reference::Handle(handle) => {
            let mut stmt = CachedStatement::bind(cache, handle, args)?;
            run_to_completion(conn, &mut stmt)
        }
        Reference::RawText(sql) => {
            let mut script = Script::new(conn, sql, args);
            let mut stmt = script.first()?;
            loop {
                let outcome = run_to_completion(conn, &mut stmt)?;
                match script.next_statement()? {
                    Some(next) => stmt = next,
                    None => return Ok(outcome),
                }
            }
        }
    }
}

/// Steps `stmt` until it is done, discarding any rows.
pub(crate) fn drain(stmt: &mut Statement) -> PrepResult<()> {
    while stmt.step()? == StepResult::Row {}
    Ok(())
}

fn run_to_completion(conn: &Connection, stmt: &mut Statement) -> PrepResult<ExecOutcome> {
    drain(stmt)?;
    if stmt.is_read_only() {
        return Ok(ExecOutcome::UNAVAILABLE);
    }
    // Statements other than INSERT, UPDATE and DELETE leave the change count
    // of the previous one in place.
    Ok(ExecOutcome {
        rows_affected: conn.changes(),
        last_insert_id: conn.last_insert_rowid(),
    })
}

#[cfg(test)]
mod tests {
    use prepkit_db::params;

    use super::*;
    use crate::error::PrepError;
    use crate::reference::StatementHandle;

    fn setup() -> (Connection, StatementCache) {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT);")
            .expect("create table");
        (conn, StatementCache::default())
    }

    #[test]
    fn test_raw_text_is_one_shot() {
        let (conn, mut cache) = setup();
        let outcome = execute(
            &conn,
            &mut cache,
            Reference::RawText("INSERT INTO t (name) VALUES (?1)"),
            params!["x"],
        )
        .expect("exec");
        assert_eq!(
            outcome,
            ExecOutcome {
                rows_affected: 1,
                last_insert_id: 1
            }
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cached_statement_is_reusable() {
        let (conn, mut cache) = setup();
        let handle = cache
            .prepare(&conn, "INSERT INTO t (name) VALUES (?1)")
            .expect("prepare");
        for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
            let outcome = execute(&conn, &mut cache, Reference::Handle(handle), params![name])
                .expect("exec");
            assert_eq!(outcome.rows_affected, 1);
            assert_eq!(
                outcome.last_insert_id,
                i64::try_from(i + 1).expect("small index")
            );
        }
    }

    #[test]
    fn test_missing_handle_never_falls_back() {
        let (conn, mut cache) = setup();
        let err = execute(
            &conn,
            &mut cache,
            Reference::Handle(StatementHandle::new(12)),
            &[],
        )
        .expect_err("miss");
        assert_eq!(err, PrepError::NoSuchStatement);
    }

    #[test]
    fn test_argument_count_mismatch() {
        let (conn, mut cache) = setup();
        let err = execute(
            &conn,
            &mut cache,
            Reference::RawText("INSERT INTO t (name) VALUES (?1)"),
            &[],
        )
        .expect_err("missing arg");
        assert_eq!(err, PrepError::ArgumentCount { expected: 1, got: 0 });
    }

    #[test]
    fn test_update_reports_every_changed_row() {
        let (conn, mut cache) = setup();
        conn.execute_batch("INSERT INTO t (name) VALUES ('a'), ('b'), ('c');")
            .expect("seed");
        let outcome = execute(
            &conn,
            &mut cache,
            Reference::RawText("UPDATE t SET name = ?1 WHERE id > 1"),
            params!["z"],
        )
        .expect("exec");
        assert_eq!(outcome.rows_affected, 2);
    }

    #[test]
    fn test_read_only_statement_reports_sentinels() {
        let (conn, mut cache) = setup();
        let outcome = execute(&conn, &mut cache, Reference::RawText("SELECT * FROM t"), &[])
            .expect("exec");
        assert_eq!(outcome, ExecOutcome::UNAVAILABLE);
    }

    #[test]
    fn test_runtime_error_is_verbatim() {
        let (conn, mut cache) = setup();
        conn.execute_batch("INSERT INTO t (id, name) VALUES (1, 'a');")
            .expect("seed");
        let err = execute(
            &conn,
            &mut cache,
            Reference::RawText("INSERT INTO t (id, name) VALUES (1, 'b')"),
            &[],
        )
        .expect_err("duplicate key");
        assert!(
            matches!(err, PrepError::Engine(ref msg) if msg.contains("UNIQUE constraint failed")),
            "got: {err}"
        );
    }

    #[test]
    fn test_failed_cached_run_leaves_statement_usable() {
        let (conn, mut cache) = setup();
        let handle = cache
            .prepare(&conn, "INSERT INTO t (id, name) VALUES (?1, ?2)")
            .expect("prepare");
        execute(&conn, &mut cache, Reference::Handle(handle), params![1_i64, "a"])
            .expect("first insert");
        execute(&conn, &mut cache, Reference::Handle(handle), params![1_i64, "b"])
            .expect_err("duplicate key");
        let outcome = execute(&conn, &mut cache, Reference::Handle(handle), params![2_i64, "b"])
            .expect("statement still usable");
        assert_eq!(outcome.last_insert_id, 2);
    }

    #[test]
    fn test_raw_text_runs_every_statement() {
        let (conn, mut cache) = setup();
        let outcome = execute(
            &conn,
            &mut cache,
            Reference::RawText("CREATE TABLE a (x); CREATE TABLE b (y);"),
            &[],
        )
        .expect("exec");
        assert_eq!(outcome.rows_affected, 0);
        execute(&conn, &mut cache, Reference::RawText("SELECT * FROM b"), &[])
            .expect("second table exists");
    }

    #[test]
    fn test_raw_text_shares_out_arguments() {
        let (conn, mut cache) = setup();
        let outcome = execute(
            &conn,
            &mut cache,
            Reference::RawText(
                "INSERT INTO t (name) VALUES (?1); INSERT INTO t (name) VALUES (?1), (?2)",
            ),
            params!["a", "b", "c"],
        )
        .expect("exec");
        assert_eq!(
            outcome,
            ExecOutcome {
                rows_affected: 2,
                last_insert_id: 3
            }
        );
    }

    #[test]
    fn test_raw_text_argument_counts_span_statements() {
        let (conn, mut cache) = setup();
        let err = execute(
            &conn,
            &mut cache,
            Reference::RawText("SELECT ?1; SELECT ?1"),
            params![1_i64],
        )
        .expect_err("second statement lacks its argument");
        assert_eq!(err, PrepError::ArgumentCount { expected: 2, got: 1 });

        let err = execute(
            &conn,
            &mut cache,
            Reference::RawText("SELECT ?1; SELECT 2"),
            params![1_i64, 2_i64],
        )
        .expect_err("argument left over");
        assert_eq!(err, PrepError::ArgumentCount { expected: 1, got: 2 });
    }

    #[test]
    fn test_later_statement_compiles_against_earlier_effects() {
        let (conn, mut cache) = setup();
        let outcome = execute(
            &conn,
            &mut cache,
            Reference::RawText("CREATE TABLE n (v); INSERT INTO n (v) VALUES (?1)"),
            params![9_i64],
        )
        .expect("exec");
        assert_eq!(outcome.rows_affected, 1);
    }

    #[test]
    fn test_ddl_reports_previous_change_count() {
        let (conn, mut cache) = setup();
        execute(
            &conn,
            &mut cache,
            Reference::RawText("INSERT INTO t (name) VALUES ('a'), ('b'), ('c')"),
            &[],
        )
        .expect("insert");
        let outcome = execute(
            &conn,
            &mut cache,
            Reference::RawText("CREATE TABLE later (v)"),
            &[],
        )
        .expect("create");
        assert_eq!(
            outcome,
            ExecOutcome {
                rows_affected: 3,
                last_insert_id: 3
            }
        );
    }
}
