//! Scalar values carried by output documents.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Compact UTC rendering used wherever a timestamp takes part in an identity.
pub const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// A flat output document.
///
/// Keys are kept in lexicographic order so that serializing the same
/// logical document always yields the same bytes.
pub type Document = BTreeMap<String, Value>;

/// A scalar field value.
///
/// Deserialization never produces [`Value::Timestamp`]: strings from job
/// configuration stay strings, timestamps only enter documents through the
/// assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Timestamp(#[serde(with = "rfc3339_offset")] DateTime<Utc>),
}

impl Value {
    /// Midnight UTC on the given calendar date.
    pub fn midnight_utc(date: NaiveDate) -> Self {
        Self::Timestamp(date.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }

    /// Total order used to sort documents before grouping.
    ///
    /// Numbers compare numerically across `Integer` and `Float`, so `2` and
    /// `2.0` land in the same group. Otherwise values order by kind:
    /// numbers, then strings, then timestamps.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let left = a.as_f64().unwrap_or_default();
                let right = b.as_f64().unwrap_or_default();
                left.total_cmp(&right)
            }
            (a, b) => a.kind_rank().cmp(&b.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Self::Integer(_) | Self::Float(_) => 0,
            Self::String(_) => 1,
            Self::Timestamp(_) => 2,
        }
    }
}

/// Identity rendering.
///
/// Floats use the shortest round-trip digits with a trailing `.0` on
/// integral values and a signed, at least two-digit exponent (`1e+16`,
/// `1.5e-05`). Timestamps render as [`ID_TIMESTAMP_FORMAT`] wherever they
/// appear, including explicit id fields, so `_timestamp` contributes
/// `20130401000000` rather than an ISO form.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write_float(f, *value),
            Self::String(value) => f.write_str(value),
            Self::Timestamp(value) => write!(f, "{}", value.format(ID_TIMESTAMP_FORMAT)),
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("nan");
    }
    // Debug keeps the trailing ".0" and switches to exponent form below
    // 1e-4 and from 1e16.
    let rendered = format!("{value:?}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            write!(f, "{mantissa}e{sign}{digits:0>2}")
        }
        None => f.write_str(&rendered),
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// RFC 3339 with an explicit `+00:00` offset.
mod rfc3339_offset {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_identity_rendering() {
        assert_eq!(Value::from("foo").to_string(), "foo");
        assert_eq!(Value::Integer(12345).to_string(), "12345");
        assert_eq!(Value::Float(23.4).to_string(), "23.4");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        let date = NaiveDate::from_ymd_opt(2013, 4, 1).unwrap();
        assert_eq!(Value::midnight_utc(date).to_string(), "20130401000000");
    }

    #[test]
    fn float_exponents_are_signed_and_padded() {
        assert_eq!(Value::Float(1e16).to_string(), "1e+16");
        assert_eq!(Value::Float(1.5e300).to_string(), "1.5e+300");
        assert_eq!(Value::Float(1.5e-5).to_string(), "1.5e-05");
        assert_eq!(Value::Float(-2e-7).to_string(), "-2e-07");
        assert_eq!(Value::Float(1e15).to_string(), "1000000000000000.0");
        assert_eq!(Value::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::Float(f64::NAN).to_string(), "nan");
    }

    #[test]
    fn timestamps_serialize_with_offset() {
        let date = NaiveDate::from_ymd_opt(2013, 4, 1).unwrap();
        let json = serde_json::to_string(&Value::midnight_utc(date)).unwrap();
        assert_eq!(json, "\"2013-04-01T00:00:00+00:00\"");
    }

    #[test]
    fn configuration_strings_stay_strings() {
        let value: Value = serde_json::from_str("\"2013-04-01T00:00:00+00:00\"").unwrap();
        assert_eq!(value, Value::from("2013-04-01T00:00:00+00:00"));
        let value: Value = serde_json::from_str("100").unwrap();
        assert_eq!(value, Value::Integer(100));
        let value: Value = serde_json::from_str("0.25").unwrap();
        assert_eq!(value, Value::Float(0.25));
    }

    #[test]
    fn integers_and_floats_compare_numerically() {
        assert_eq!(
            Value::Integer(2).total_cmp(&Value::Float(2.0)),
            Ordering::Equal
        );
        assert_eq!(
            Value::Integer(1).total_cmp(&Value::from("1")),
            Ordering::Less
        );
    }
}
