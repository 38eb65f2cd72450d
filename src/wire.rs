//! Scalar types that serialize the way the Oblio API expects them on the wire.
//!
//! The API is inconsistent about how it types fields: booleans travel as
//! `"0"`/`"1"` strings, integers are quoted, dates are `YYYY-MM-DD` strings and
//! timestamps are bare unix seconds. Responses are looser still, so decoding
//! accepts every representation the API has been seen to send.
//!
//! Each type implements [`WireValue`] for explicit conversions and serde's
//! traits on top of it, so request and response structs can stay declarative.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A wire value that could not be parsed into its domain type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value: {value}")]
pub struct FormatError {
    /// Name of the target kind ("bool", "int", "date", "timestamp")
    pub kind: &'static str,
    /// The offending input, as received
    pub value: String,
}

impl FormatError {
    fn new(kind: &'static str, value: impl Into<String>) -> Self {
        FormatError {
            kind,
            value: value.into(),
        }
    }

    fn from_json(kind: &'static str, value: &Value) -> Self {
        match value {
            Value::String(s) => FormatError::new(kind, s.clone()),
            other => FormatError::new(kind, other.to_string()),
        }
    }
}

/// Conversion between a domain scalar and its two wire encodings.
pub trait WireValue: Sized {
    /// Encode for a JSON request body
    fn to_json(&self) -> Value;

    /// Encode for a URL query string
    fn to_query(&self) -> String;

    /// Decode from any JSON representation the API may send
    fn from_json(value: &Value) -> Result<Self, FormatError>;

    /// Decode from raw text such as a query parameter
    fn from_text(text: &str) -> Result<Self, FormatError> {
        Self::from_json(&Value::String(text.to_string()))
    }
}

fn trim_quoted(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '"')
}

macro_rules! impl_wire_serde {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    self.to_json().serialize(serializer)
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    let value = Value::deserialize(deserializer)?;
                    <$ty as WireValue>::from_json(&value).map_err(D::Error::custom)
                }
            }
        )+
    };
}

/// Boolean sent as `"1"` / `"0"`.
///
/// Fields of this type should carry `#[serde(default)]` so an absent field
/// decodes to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bool(pub bool);

impl Bool {
    pub fn get(self) -> bool {
        self.0
    }

    pub fn is_false(&self) -> bool {
        !self.0
    }
}

impl From<bool> for Bool {
    fn from(b: bool) -> Self {
        Bool(b)
    }
}

impl From<Bool> for bool {
    fn from(b: Bool) -> Self {
        b.0
    }
}

impl WireValue for Bool {
    fn to_json(&self) -> Value {
        Value::String(self.to_query())
    }

    fn to_query(&self) -> String {
        let s = if self.0 { "1" } else { "0" };
        s.to_string()
    }

    fn from_json(value: &Value) -> Result<Self, FormatError> {
        match value {
            Value::Null => Ok(Bool(false)),
            Value::Bool(b) => Ok(Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Bool(i != 0))
                } else if let Some(u) = n.as_u64() {
                    Ok(Bool(u != 0))
                } else {
                    Err(FormatError::from_json("bool", value))
                }
            }
            Value::String(s) => match trim_quoted(s) {
                "1" | "true" => Ok(Bool(true)),
                "0" | "false" => Ok(Bool(false)),
                _ => Err(FormatError::new("bool", s.clone())),
            },
            other => Err(FormatError::from_json("bool", other)),
        }
    }
}

/// Integer sent as a quoted decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Int(pub i64);

impl Int {
    pub fn get(self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for Int {
    fn from(n: i64) -> Self {
        Int(n)
    }
}

impl From<Int> for i64 {
    fn from(n: Int) -> Self {
        n.0
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl WireValue for Int {
    fn to_json(&self) -> Value {
        Value::String(self.to_query())
    }

    fn to_query(&self) -> String {
        self.0.to_string()
    }

    fn from_json(value: &Value) -> Result<Self, FormatError> {
        match value {
            Value::Null => Ok(Int(0)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Int(i))
                } else if n.is_f64() {
                    // f64 -> i64 `as` truncates toward zero
                    Ok(Int(n.as_f64().unwrap_or_default() as i64))
                } else {
                    Err(FormatError::from_json("int", value))
                }
            }
            Value::String(s) => {
                let trimmed = trim_quoted(s);
                if trimmed.is_empty() {
                    return Ok(Int(0));
                }
                trimmed
                    .parse::<i64>()
                    .map(Int)
                    .map_err(|_| FormatError::new("int", s.clone()))
            }
            other => Err(FormatError::from_json("int", other)),
        }
    }
}

/// Calendar date sent as `YYYY-MM-DD`.
///
/// The zero date means "not set". It encodes as an empty string; request
/// structs skip it with `#[serde(skip_serializing_if = "Date::is_zero")]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(Option<NaiveDate>);

impl Date {
    /// Build a date; `(0, 0, 0)` yields the zero date and invalid dates yield `None`.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        if year == 0 && month == 0 && day == 0 {
            return Some(Date(None));
        }
        NaiveDate::from_ymd_opt(year, month, day).map(|d| Date(Some(d)))
    }

    pub fn zero() -> Self {
        Date(None)
    }

    pub fn today() -> Self {
        Date(Some(Utc::now().date_naive()))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_naive(&self) -> Option<NaiveDate> {
        self.0
    }

    pub fn year(&self) -> Option<i32> {
        self.0.map(|d| d.year())
    }
}

impl From<NaiveDate> for Date {
    fn from(d: NaiveDate) -> Self {
        Date(Some(d))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            None => Ok(()),
        }
    }
}

impl WireValue for Date {
    fn to_json(&self) -> Value {
        Value::String(self.to_query())
    }

    fn to_query(&self) -> String {
        self.to_string()
    }

    fn from_json(value: &Value) -> Result<Self, FormatError> {
        match value {
            Value::Null => Ok(Date(None)),
            Value::String(s) => {
                let trimmed = trim_quoted(s);
                if trimmed.is_empty() || trimmed == "null" {
                    return Ok(Date(None));
                }
                // chrono accepts unpadded fields; the API never sends them
                if trimmed.len() != 10 {
                    return Err(FormatError::new("date", s.clone()));
                }
                NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                    .map(|d| Date(Some(d)))
                    .map_err(|_| FormatError::new("date", s.clone()))
            }
            other => Err(FormatError::from_json("date", other)),
        }
    }
}

/// Point in time sent as whole seconds since the Unix epoch.
///
/// The zero value is the epoch itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Create a Timestamp from unix seconds
    pub fn from_unix(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Timestamp)
    }

    pub fn now() -> Self {
        Timestamp(Utc::now())
    }

    /// Get the unix timestamp in seconds
    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn is_zero(&self) -> bool {
        self.unix() == 0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(t: Timestamp) -> Self {
        t.0
    }
}

impl WireValue for Timestamp {
    fn to_json(&self) -> Value {
        Value::Number(self.unix().into())
    }

    fn to_query(&self) -> String {
        self.unix().to_string()
    }

    fn from_json(value: &Value) -> Result<Self, FormatError> {
        let secs = match value {
            Value::Null => return Ok(Timestamp::default()),
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| FormatError::from_json("timestamp", value))?,
            Value::String(s) => {
                let trimmed = trim_quoted(s);
                if trimmed.is_empty() || trimmed == "null" {
                    return Ok(Timestamp::default());
                }
                trimmed
                    .parse::<i64>()
                    .map_err(|_| FormatError::new("timestamp", s.clone()))?
            }
            other => return Err(FormatError::from_json("timestamp", other)),
        };

        Timestamp::from_unix(secs).ok_or_else(|| FormatError::new("timestamp", secs.to_string()))
    }
}

impl_wire_serde!(Bool, Int, Date, Timestamp);
