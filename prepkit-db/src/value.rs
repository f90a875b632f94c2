//! Dynamically typed values exchanged with the engine.

/// One value per `SQLite` storage class. Used both for bound parameters and
/// for the columns of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit IEEE floating point number.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Binary blob.
    Blob(Vec<u8>),
}

macro_rules! impl_from {
    ($($ty:ty => |$v:ident| $expr:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $expr
                }
            }
        )*
    };
}

impl_from! {
    i64 => |v| Self::Integer(v),
    f64 => |v| Self::Real(v),
    String => |v| Self::Text(v),
    &str => |v| Self::Text(v.to_owned()),
    Vec<u8> => |v| Self::Blob(v),
    &[u8] => |v| Self::Blob(v.to_vec()),
}

/// Builds a `&[Value]` parameter slice from anything convertible to
/// [`Value`].
///
/// ```
/// use prepkit_db::{params, Value};
///
/// let args = params![1_i64, "text", vec![0_u8, 1]];
/// assert_eq!(args[1], Value::Text("text".into()));
/// ```
#[macro_export]
macro_rules! params {
    ($($val:expr),* $(,)?) => {
        &[$($crate::Value::from($val)),*][..]
    };
}
