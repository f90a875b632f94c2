//! Positional argument values as they cross the foreign-function boundary.

use prepkit_db::Value;

/// A dynamically typed argument supplied by the host.
///
/// Values are passed through to the engine unchanged; no coercion happens
/// in this layer.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point number.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Binary blob.
    Blob(Vec<u8>),
}

impl From<SqlValue> for Value {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Self::Null,
            SqlValue::Integer(v) => Self::Integer(v),
            SqlValue::Real(v) => Self::Real(v),
            SqlValue::Text(v) => Self::Text(v),
            SqlValue::Blob(v) => Self::Blob(v),
        }
    }
}

/// Converts host arguments into engine values.
pub(crate) fn to_engine_values(args: Vec<SqlValue>) -> Vec<Value> {
    args.into_iter().map(Value::from).collect()
}
