//! Column values and parameter values
//!
//! [`Value`] is both what drivers hand back for each column and what
//! callers pass as positional parameters (`$1..$n`).

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

/// A single SQL value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Name of the variant, used in decode errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{}", v),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// A value could not be converted into the requested Rust type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("converting {found} to {expected} is unsupported")]
pub struct DecodeError {
    pub expected: &'static str,
    pub found: String,
}

impl DecodeError {
    fn new(expected: &'static str, value: &Value) -> Self {
        Self {
            expected,
            found: value.kind().to_owned(),
        }
    }

    pub(crate) fn invalid(expected: &'static str, detail: impl fmt::Display) -> Self {
        Self {
            expected,
            found: detail.to_string(),
        }
    }
}

/// Decode a column value into a Rust type
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, DecodeError>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| DecodeError::invalid("int64", format!("text {:?}", s))),
            other => Err(DecodeError::new("int64", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let wide = i64::from_value(value).map_err(|e| DecodeError { expected: "int32", ..e })?;
        i32::try_from(wide).map_err(|_| DecodeError::invalid("int32", format!("{} (out of range)", wide)))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(DecodeError::new("float64", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            other => Err(DecodeError::new("bool", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Err(DecodeError::new("string", value)),
            Value::Timestamp(ts) => Ok(ts.to_rfc3339()),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Timestamp(ts) => Ok(*ts),
            Value::Text(s) => parse_timestamp(s)
                .ok_or_else(|| DecodeError::invalid("timestamp", format!("text {:?}", s))),
            other => Err(DecodeError::new("timestamp", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Parse RFC 3339 first, then the textual forms PostgreSQL emits.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn decodes_integers() {
        assert_eq!(i64::from_value(&Value::Int(7)).unwrap(), 7);
        assert_eq!(i32::from_value(&Value::Int(7)).unwrap(), 7);
        assert_eq!(i64::from_value(&Value::Text("42".into())).unwrap(), 42);
    }

    #[test]
    fn null_into_non_option_fails() {
        let err = i64::from_value(&Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "converting NULL to int64 is unsupported");
        assert_eq!(Option::<i64>::from_value(&Value::Null).unwrap(), None);
    }

    #[test]
    fn i32_range_is_checked() {
        assert!(i32::from_value(&Value::Int(i64::MAX)).is_err());
    }

    #[test]
    fn strings_accept_any_non_null_value() {
        assert_eq!(String::from_value(&Value::Int(5)).unwrap(), "5");
        assert_eq!(String::from_value(&Value::Text("a".into())).unwrap(), "a");
        assert!(String::from_value(&Value::Null).is_err());
    }

    #[test]
    fn timestamps_parse_from_text() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        let rfc = DateTime::<Utc>::from_value(&Value::Text("2023-01-02T03:04:05Z".into())).unwrap();
        assert_eq!(rfc, expected);

        let pg = DateTime::<Utc>::from_value(&Value::Text("2023-01-02 03:04:05+00".into())).unwrap();
        assert_eq!(pg, expected);

        assert!(DateTime::<Utc>::from_value(&Value::Text("yesterday".into())).is_err());
    }

    #[test]
    fn option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }
}
