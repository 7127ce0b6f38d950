//! Scalar values carried by a [`Record`](crate::Record).
//!
//! [`Value`] is a closed set of variants so that every formatting and
//! binding path has to handle each case explicitly.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::error::StatementError;

/// Text layout used for date/time values, both inlined and bound.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single field value.
///
/// # Examples
///
/// ```
/// use recordsql_core::Value;
///
/// assert_eq!(Value::from("O'Brien"), Value::Text("O'Brien".into()));
/// assert_eq!(Value::from(30), Value::Int(30));
/// assert!(Value::from(f64::NAN).is_null());
/// assert!(Value::from(None::<i64>).is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL `NULL`.
    #[default]
    Null,
    /// Boolean, stored by most engines as `0` / `1`.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point. NaN is treated as [`Value::Null`] everywhere.
    Float(f64),
    /// Unicode text.
    Text(String),
    /// Date and time without timezone.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns `true` for `Null` and for a floating-point NaN.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Returns the value with NaN replaced by `Null`.
    pub fn normalized(self) -> Self {
        if self.is_null() { Self::Null } else { self }
    }

    /// Infers a value from loosely-typed text.
    ///
    /// Recognizes `null`, `true`/`false`, integers, floats and
    /// `YYYY-MM-DD HH:MM:SS` date-times; anything else is text.
    ///
    /// Text wrapped in single or double quotes is taken literally without
    /// the quotes. Numbers written with a leading zero (`00123`) stay text
    /// so the zeros survive.
    ///
    /// # Examples
    ///
    /// ```
    /// use recordsql_core::Value;
    ///
    /// assert_eq!(Value::infer("42"), Value::Int(42));
    /// assert_eq!(Value::infer("true"), Value::Bool(true));
    /// assert_eq!(Value::infer("Alice"), Value::Text("Alice".into()));
    /// assert_eq!(Value::infer("00123"), Value::Text("00123".into()));
    /// assert_eq!(Value::infer("'42'"), Value::Text("42".into()));
    /// ```
    pub fn infer(raw: &str) -> Self {
        match raw {
            "null" | "NULL" => return Self::Null,
            "true" | "TRUE" => return Self::Bool(true),
            "false" | "FALSE" => return Self::Bool(false),
            _ => {}
        }
        if let Some(quoted) = unquote(raw) {
            return Self::Text(quoted.to_string());
        }
        if has_leading_zero(raw) {
            return Self::Text(raw.to_string());
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
            return Self::DateTime(dt);
        }
        Self::Text(raw.to_string())
    }
}

/// Strips one pair of matching `'` or `"` quotes.
fn unquote(raw: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|quote| {
        raw.strip_prefix(quote)?.strip_suffix(quote)
    })
}

/// `true` for digit strings like `007` or `-0012` whose zeros are significant.
fn has_leading_zero(raw: &str) -> bool {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw).as_bytes();
    matches!(digits, [b'0', next, ..] if next.is_ascii_digit())
        && digits.iter().all(|b| b.is_ascii_digit() || *b == b'.')
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

/// Dates are widened to midnight.
impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::DateTime(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = StatementError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if n.is_u64() {
                    Err(StatementError::UnsupportedValue(format!(
                        "integer {n} does not fit a signed 64-bit integer"
                    )))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(StatementError::UnsupportedValue(format!(
                        "number {n} does not fit a 64-bit integer or float"
                    )))
                }
            }
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => Err(
                StatementError::UnsupportedValue(format!("{other} is not a scalar")),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) if f.is_nan() => serializer.serialize_none(),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::DateTime(dt) => serializer.collect_str(&dt.format(DATETIME_FORMAT)),
        }
    }
}
