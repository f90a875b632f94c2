//! Encoding of result rows into self-contained JSON records.
//!
//! | engine value | JSON                     |
//! |--------------|--------------------------|
//! | `Null`       | `null`                   |
//! | `Integer`    | number                   |
//! | `Real`       | number (finite only)     |
//! | `Text`       | string                   |
//! | `Blob`       | standard base64 string   |
//!
//! Object records emit their keys in sorted order. When the engine reports
//! the same column name twice, the value of the last such column wins.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Number, Value as Json};
use strum::Display;
use thiserror::Error;

use prepkit_db::Value;

/// Shape of an encoded record, chosen by the caller per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RecordShape {
    /// `[v1, v2, ...]` in column order; column names are discarded.
    Array,
    /// `{"column": value, ...}`.
    Object,
}

impl RecordShape {
    /// Maps the boundary's `as_map` flag to a shape.
    #[must_use]
    pub const fn from_as_map(as_map: bool) -> Self {
        if as_map {
            Self::Object
        } else {
            Self::Array
        }
    }
}

/// Why a row could not be encoded. Row-local: the query runner drops the row.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// JSON has no representation for NaN or infinities.
    #[error("column {column}: non-finite real {value} cannot be encoded")]
    NonFiniteReal {
        /// Zero-based column index.
        column: usize,
        /// Offending value.
        value: f64,
    },
    /// The JSON writer failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Encodes one row. `columns` and `values` are parallel, in column order.
///
/// # Errors
///
/// Returns an [`EncodeError`] if any value has no JSON representation.
pub fn encode_row(
    columns: &[String],
    values: &[Value],
    shape: RecordShape,
) -> Result<String, EncodeError> {
    let record = match shape {
        RecordShape::Array => Json::Array(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| to_json(i, v))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        RecordShape::Object => {
            let mut object = Map::new();
            for (i, (name, v)) in columns.iter().zip(values).enumerate() {
                object.insert(name.clone(), to_json(i, v)?);
            }
            Json::Object(object)
        }
    };
    Ok(serde_json::to_string(&record)?)
}

fn to_json(column: usize, value: &Value) -> Result<Json, EncodeError> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Integer(v) => Json::from(*v),
        Value::Real(v) => Number::from_f64(*v)
            .map(Json::Number)
            .ok_or(EncodeError::NonFiniteReal { column, value: *v })?,
        Value::Text(v) => Json::String(v.clone()),
        Value::Blob(v) => Json::String(STANDARD.encode(v)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_object_shape() {
        let encoded = encode_row(
            &columns(&["id", "name"]),
            &[Value::Integer(1), Value::from("a")],
            RecordShape::Object,
        )
        .expect("encode");
        assert_eq!(encoded, r#"{"id":1,"name":"a"}"#);
    }

    #[test]
    fn test_array_shape_discards_names() {
        let encoded = encode_row(
            &columns(&["id", "name"]),
            &[Value::Integer(1), Value::from("a")],
            RecordShape::Array,
        )
        .expect("encode");
        assert_eq!(encoded, r#"[1,"a"]"#);
    }

    #[test]
    fn test_every_storage_class() {
        let encoded = encode_row(
            &columns(&["n", "i", "r", "t", "b"]),
            &[
                Value::Null,
                Value::Integer(-7),
                Value::Real(2.5),
                Value::from("h\"i"),
                Value::Blob(vec![0xde, 0xad, 0xbe, 0xef]),
            ],
            RecordShape::Array,
        )
        .expect("encode");
        assert_eq!(encoded, r#"[null,-7,2.5,"h\"i","3q2+7w=="]"#);
    }

    #[test]
    fn test_object_keys_are_sorted() {
        let encoded = encode_row(
            &columns(&["zeta", "alpha"]),
            &[Value::Integer(1), Value::Integer(2)],
            RecordShape::Object,
        )
        .expect("encode");
        assert_eq!(encoded, r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn test_duplicate_column_last_write_wins() {
        let encoded = encode_row(
            &columns(&["v", "v"]),
            &[Value::Integer(1), Value::Integer(2)],
            RecordShape::Object,
        )
        .expect("encode");
        assert_eq!(encoded, r#"{"v":2}"#);
    }

    #[test]
    fn test_non_finite_real_fails() {
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = encode_row(&columns(&["x"]), &[Value::Real(value)], RecordShape::Array)
                .expect_err("non-finite");
            assert!(matches!(err, EncodeError::NonFiniteReal { column: 0, .. }));
        }
    }

    #[test]
    fn test_empty_row() {
        assert_eq!(encode_row(&[], &[], RecordShape::Array).expect("encode"), "[]");
        assert_eq!(encode_row(&[], &[], RecordShape::Object).expect("encode"), "{}");
    }

    #[test]
    fn test_shape_from_flag() {
        assert_eq!(RecordShape::from_as_map(true), RecordShape::Object);
        assert_eq!(RecordShape::from_as_map(false), RecordShape::Array);
        assert_eq!(RecordShape::Object.to_string(), "object");
    }
}
