//! Parsing of one input line into a session call.
//!
//! A line is a JSON array whose first element names the call:
//!
//! ```text
//! ["prep", "SELECT * FROM t WHERE id = ?"]
//! ["exec", "2", "alice", 30]
//! ["query", "3", 1]
//! ["map", "SELECT * FROM t"]
//! ```
//!
//! Arguments map to [`SqlValue`]: `null`, integers, floats and strings pass
//! through, booleans become `0`/`1`, and `{"blob": "<base64>"}` is a blob.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use eyre::{bail, eyre, Result, WrapErr};
use prepkit_core::SqlValue;
use serde_json::Value as Json;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `prep`: compile, close or clear.
    Prep(String),
    /// `exec`: run a mutating statement.
    Exec {
        /// Handle or SQL text.
        reference: String,
        /// Positional arguments.
        args: Vec<SqlValue>,
    },
    /// `query` (arrays) and `map` (objects).
    Query {
        /// Handle or SQL text.
        reference: String,
        /// Positional arguments.
        args: Vec<SqlValue>,
        /// Emit object records.
        as_map: bool,
    },
}

impl Command {
    /// Parses one line.
    ///
    /// # Errors
    ///
    /// Malformed JSON, an unknown verb, a missing or non-string reference,
    /// or an argument with no [`SqlValue`] mapping.
    pub fn parse(line: &str) -> Result<Self> {
        let parts: Vec<Json> = serde_json::from_str(line).wrap_err("expected a JSON array")?;
        let mut parts = parts.into_iter();

        let verb = match parts.next() {
            Some(Json::String(verb)) => verb,
            Some(other) => bail!("command name must be a string, got {other}"),
            None => bail!("empty command"),
        };
        let reference = match parts.next() {
            Some(Json::String(reference)) => reference,
            Some(other) => bail!("reference must be a string, got {other}"),
            None => bail!("{verb}: missing reference"),
        };
        let args = parts.map(to_sql_value).collect::<Result<Vec<_>>>()?;

        match verb.as_str() {
            "prep" if args.is_empty() => Ok(Self::Prep(reference)),
            "prep" => bail!("prep takes no arguments"),
            "exec" => Ok(Self::Exec { reference, args }),
            "query" | "map" => Ok(Self::Query {
                reference,
                args,
                as_map: verb == "map",
            }),
            other => bail!("unknown command {other:?}"),
        }
    }
}

fn to_sql_value(value: Json) -> Result<SqlValue> {
    Ok(match value {
        Json::Null => SqlValue::Null,
        Json::Bool(b) => SqlValue::Integer(i64::from(b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().ok_or_else(|| eyre!("unsupported number {n}"))?),
        },
        Json::String(s) => SqlValue::Text(s),
        Json::Object(mut object) if object.len() == 1 => match object.remove("blob") {
            Some(Json::String(encoded)) => {
                SqlValue::Blob(STANDARD.decode(encoded).wrap_err("invalid base64 blob")?)
            }
            _ => bail!("unsupported argument object"),
        },
        other => bail!("unsupported argument {other}"),
    })
}
