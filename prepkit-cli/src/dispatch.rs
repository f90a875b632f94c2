//! The read-eval-print loop driving a [`Session`].

use std::io::{BufRead, Write};

use eyre::{Result, WrapErr};
use prepkit_core::Session;

use crate::command::Command;

/// Runs every line of `input` against `session`, writing results to `out`.
///
/// A failing line prints `ERR <message>` and the loop moves on. Blank lines
/// are skipped. `default_limit` applies to every query.
///
/// # Errors
///
/// Only I/O errors on `input` or `out` stop the loop.
pub fn run_lines(
    session: &Session,
    input: impl BufRead,
    mut out: impl Write,
    default_limit: i64,
) -> Result<()> {
    for line in input.lines() {
        let line = line.wrap_err("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        run_line(session, &line, &mut out, default_limit)?;
    }
    out.flush().wrap_err("failed to flush output")
}

/// Runs a single command line.
///
/// # Errors
///
/// Only I/O errors on `out`.
pub fn run_line(
    session: &Session,
    line: &str,
    out: &mut impl Write,
    default_limit: i64,
) -> Result<()> {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(err) => {
            tracing::debug!(%line, "rejected input line");
            writeln!(out, "ERR {err:#}")?;
            return Ok(());
        }
    };

    match command {
        Command::Prep(reference) => match session.prep(&reference) {
            Ok(handle) => writeln!(out, "{handle}")?,
            Err(err) => writeln!(out, "ERR {err}")?,
        },
        Command::Exec { reference, args } => match session.exec(&reference, args) {
            Ok(outcome) => writeln!(out, "{} {}", outcome.rows_affected, outcome.last_insert_id)?,
            Err(err) => writeln!(out, "ERR {err}")?,
        },
        Command::Query {
            reference,
            args,
            as_map,
        } => match session.query(&reference, args, as_map, default_limit) {
            Ok(outcome) => {
                for record in &outcome.records {
                    writeln!(out, "{record}")?;
                }
                if let Some(err) = outcome.error {
                    writeln!(out, "ERR {err}")?;
                }
            }
            Err(err) => writeln!(out, "ERR {err}")?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(script: &str) -> String {
        let session = Session::open_in_memory().unwrap();
        let mut out = Vec::new();
        run_lines(&session, script.as_bytes(), &mut out, 0).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_script() {
        let output = run(concat!(
            "[\"exec\", \"CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)\"]\n",
            "[\"prep\", \"INSERT INTO t (name) VALUES (?)\"]\n",
            "\n",
            "[\"exec\", \"2\", \"x\"]\n",
            "[\"exec\", \"2\", \"y\"]\n",
            "[\"map\", \"SELECT id, name FROM t ORDER BY id\"]\n",
            "[\"query\", \"SELECT name FROM t WHERE id = ?\", 2]\n",
            "[\"prep\", \"2\"]\n",
            "[\"exec\", \"2\", \"z\"]\n",
        ));
        assert_eq!(
            output,
            concat!(
                "0 0\n",
                "2\n",
                "1 1\n",
                "1 2\n",
                "{\"id\":1,\"name\":\"x\"}\n",
                "{\"id\":2,\"name\":\"y\"}\n",
                "[\"y\"]\n",
                "0\n",
                "ERR no such prepared statement index\n",
            )
        );
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let output = run("garbage\n[\"prep\", \"9\"]\n[\"prep\", \"clean_prep_cache\"]\n");
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ERR expected a JSON array"));
        assert_eq!(lines[1], "ERR invalid prepared statement index");
        assert_eq!(lines[2], "0");
    }

    #[test]
    fn test_limit_applies_to_queries() {
        let session = Session::open_in_memory().unwrap();
        let mut out = Vec::new();
        run_lines(
            &session,
            "[\"query\", \"SELECT 1 UNION ALL SELECT 2 UNION ALL SELECT 3\"]\n".as_bytes(),
            &mut out,
            2,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[1]\n[2]\n");
    }

    #[test]
    fn test_partial_query_prints_rows_before_error() {
        let output = run(concat!(
            "[\"query\", \"WITH RECURSIVE c(id) AS (SELECT 1 UNION ALL SELECT id + 1 FROM c WHERE id < 5) ",
            "SELECT CASE WHEN id = 3 THEN abs(id - 9223372036854775807 - 4) ELSE id END FROM c\"]\n",
        ));
        assert_eq!(output, "[1]\n[2]\nERR integer overflow\n");
    }
}
