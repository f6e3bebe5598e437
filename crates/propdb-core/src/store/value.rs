//! Dynamic attribute values.

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// A dynamically typed attribute value.
///
/// The EAV value column stores an opaque textual representation with no
/// type tag; the concrete type is inferred only when the value is read.
/// This closed union is the only value shape that crosses the store
/// boundary — no untyped payloads escape the accessor layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// Absent value. An attribute edge with no value is data, not an error.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point.
    Real(f64),
    /// UTF-8 string.
    Text(String),
    /// Binary data; only reachable through ad-hoc queries.
    Blob(Vec<u8>),
}

impl AttrValue {
    /// Map a raw column to its SQLite storage class without text inference.
    ///
    /// Used by the ad-hoc executor, where the column type is whatever the
    /// caller's query produced.
    pub fn from_column(raw: ValueRef<'_>) -> AttrValue {
        match raw {
            ValueRef::Null => AttrValue::Null,
            ValueRef::Integer(i) => AttrValue::Integer(i),
            ValueRef::Real(f) => AttrValue::Real(f),
            ValueRef::Text(t) => AttrValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => AttrValue::Blob(b.to_vec()),
        }
    }

    /// Infer the concrete type of an EAV value column.
    ///
    /// Textual values that parse as integers or reals become numbers;
    /// everything else stays text. Numeric and NULL columns pass through.
    pub fn infer(raw: ValueRef<'_>) -> AttrValue {
        match raw {
            ValueRef::Text(t) => {
                let s = String::from_utf8_lossy(t);
                if let Ok(i) = s.parse::<i64>() {
                    AttrValue::Integer(i)
                } else if let Ok(f) = s.parse::<f64>() {
                    AttrValue::Real(f)
                } else {
                    AttrValue::Text(s.into_owned())
                }
            }
            other => AttrValue::from_column(other),
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64; integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Real(f) => Some(*f),
            AttrValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl ToSql for AttrValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            AttrValue::Null => ToSqlOutput::from(rusqlite::types::Null),
            AttrValue::Integer(i) => ToSqlOutput::from(*i),
            AttrValue::Real(f) => ToSqlOutput::from(*f),
            AttrValue::Text(s) => ToSqlOutput::from(s.as_str()),
            AttrValue::Blob(b) => ToSqlOutput::from(b.as_slice()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_from_text() {
        assert_eq!(
            AttrValue::infer(ValueRef::Text(b"10")),
            AttrValue::Integer(10)
        );
        assert_eq!(
            AttrValue::infer(ValueRef::Text(b"10.5")),
            AttrValue::Real(10.5)
        );
        assert_eq!(
            AttrValue::infer(ValueRef::Text(b"Basic Wall")),
            AttrValue::Text("Basic Wall".to_string())
        );
        assert_eq!(AttrValue::infer(ValueRef::Null), AttrValue::Null);
    }

    #[test]
    fn test_infer_negative_and_exponent() {
        assert_eq!(
            AttrValue::infer(ValueRef::Text(b"-3")),
            AttrValue::Integer(-3)
        );
        assert_eq!(
            AttrValue::infer(ValueRef::Text(b"1e3")),
            AttrValue::Real(1000.0)
        );
    }

    #[test]
    fn test_from_column_keeps_text() {
        assert_eq!(
            AttrValue::from_column(ValueRef::Text(b"42")),
            AttrValue::Text("42".to_string())
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(AttrValue::Integer(5).as_i64(), Some(5));
        assert_eq!(AttrValue::Integer(5).as_f64(), Some(5.0));
        assert_eq!(AttrValue::Real(2.5).as_f64(), Some(2.5));
        assert_eq!(AttrValue::Text("x".into()).as_str(), Some("x"));
        assert!(AttrValue::Null.is_null());
        assert_eq!(AttrValue::Text("x".into()).as_i64(), None);
    }
}
