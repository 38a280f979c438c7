//! SQL values and parameter coercion.
//!
//! This module provides safe handling of bound values to prevent SQL
//! injection. Values are always carried out-of-band and bound through
//! placeholders, never interpolated into statement text.

use serde::ser::{Serialize, Serializer};

/// A SQL value that can be bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Serializes any `Serialize` value to its JSON text form.
    ///
    /// Structured values (maps, sequences, nested structs) are stored as
    /// serialized text and decoded again at the read boundary. A value
    /// that has no serialized representation becomes `Null`.
    pub fn from_serialize<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(text) => Self::Text(text),
            Err(_) => Self::Null,
        }
    }

    /// Returns whether this value is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Blob(b) => serializer.collect_seq(b.iter()),
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl<Tz: chrono::TimeZone> ToSqlValue for chrono::DateTime<Tz> {
    /// Datetimes bind as their ISO-8601 text form.
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(
            self.with_timezone(&chrono::Utc)
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        )
    }
}

impl ToSqlValue for chrono::NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
    }
}

impl ToSqlValue for serde_json::Value {
    /// JSON primitives map to the matching SQL primitive; arrays and
    /// objects are stored as serialized text.
    fn to_sql_value(self) -> SqlValue {
        match self {
            serde_json::Value::Null => SqlValue::Null,
            serde_json::Value::Bool(b) => SqlValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    SqlValue::Float(f)
                } else {
                    SqlValue::Text(n.to_string())
                }
            }
            serde_json::Value::String(s) => SqlValue::Text(s),
            value @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                SqlValue::Text(value.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!(
            "hello".to_sql_value(),
            SqlValue::Text(String::from("hello"))
        );
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(42_i32).to_sql_value(), SqlValue::Int(42));
    }

    #[test]
    fn test_datetime_renders_iso8601() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            dt.to_sql_value(),
            SqlValue::Text(String::from("2024-03-01T12:30:00.000Z"))
        );
    }

    #[test]
    fn test_json_value_primitives_pass_through() {
        assert_eq!(json!(null).to_sql_value(), SqlValue::Null);
        assert_eq!(json!(true).to_sql_value(), SqlValue::Bool(true));
        assert_eq!(json!(7).to_sql_value(), SqlValue::Int(7));
        assert_eq!(
            json!("text").to_sql_value(),
            SqlValue::Text(String::from("text"))
        );
    }

    #[test]
    fn test_json_value_structures_serialize() {
        assert_eq!(
            json!({"a": 1}).to_sql_value(),
            SqlValue::Text(String::from(r#"{"a":1}"#))
        );
        assert_eq!(
            json!([1, 2]).to_sql_value(),
            SqlValue::Text(String::from("[1,2]"))
        );
    }

    #[test]
    fn test_from_serialize() {
        #[derive(serde::Serialize)]
        struct Info {
            foo: &'static str,
            bar: i32,
        }
        assert_eq!(
            SqlValue::from_serialize(&Info { foo: "Foo", bar: 10 }),
            SqlValue::Text(String::from(r#"{"foo":"Foo","bar":10}"#))
        );
    }

    #[test]
    fn test_serialize_to_json() {
        assert_eq!(serde_json::to_string(&SqlValue::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&SqlValue::Int(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&SqlValue::Text(String::from("x"))).unwrap(),
            "\"x\""
        );
        assert_eq!(
            serde_json::to_string(&SqlValue::Blob(vec![1, 2])).unwrap(),
            "[1,2]"
        );
    }
}
