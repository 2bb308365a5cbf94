//! Numeric coercion of provider metric strings.

use collector_model::{CollectorError, Document, RawRecord, Result, Value};

/// Metric reported in seconds that documents carry in milliseconds.
pub const SESSION_DURATION_METRIC: &str = "avgSessionDuration";

/// Parse `value` as an integer, failing that a float, failing that error.
pub fn try_number(value: &str) -> Result<Value> {
    let trimmed = value.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Ok(Value::Integer(integer));
    }
    if !trimmed.is_empty() {
        if let Ok(float) = trimmed.parse::<f64>() {
            return Ok(Value::Float(float));
        }
    }
    Err(CollectorError::not_numeric(value))
}

/// Default special fields for a record: every metric coerced to a number.
pub fn metric_special_fields(record: &RawRecord) -> Result<Document> {
    record
        .metrics
        .iter()
        .map(|(name, raw)| Ok((name.clone(), try_number(raw)?)))
        .collect()
}

/// Like [`metric_special_fields`], with session durations rescaled to
/// milliseconds.
pub fn metric_special_fields_with_durations(record: &RawRecord) -> Result<Document> {
    let mut fields = metric_special_fields(record)?;
    for (name, value) in &mut fields {
        *value = convert_durations(name, value.clone());
    }
    Ok(fields)
}

/// Seconds to milliseconds for [`SESSION_DURATION_METRIC`]; zero and other
/// metrics are returned unchanged.
pub fn convert_durations(name: &str, value: Value) -> Value {
    if name != SESSION_DURATION_METRIC {
        return value;
    }
    match value {
        Value::Integer(seconds) if seconds != 0 => Value::Integer(seconds.saturating_mul(1000)),
        Value::Float(seconds) if seconds != 0.0 => Value::Float(seconds * 1000.0),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn integers_win_over_floats() {
        assert_eq!(try_number("12345").unwrap(), Value::Integer(12345));
        assert_eq!(try_number("23.4").unwrap(), Value::Float(23.4));
        assert_eq!(try_number(" 7 ").unwrap(), Value::Integer(7));
    }

    #[test]
    fn garbage_is_not_numeric() {
        for input in ["", "abc", "1,000"] {
            let err = try_number(input).unwrap_err();
            assert!(matches!(err, CollectorError::NotNumeric { value } if value == input));
        }
    }

    #[test]
    fn special_fields_coerce_every_metric() {
        let record = RawRecord::new(NaiveDate::from_ymd_opt(2013, 4, 1).unwrap())
            .with_metric("visits", "12345")
            .with_metric("rate", "0.5");
        let fields = metric_special_fields(&record).unwrap();
        assert_eq!(fields.get("visits"), Some(&Value::Integer(12345)));
        assert_eq!(fields.get("rate"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn special_fields_fail_on_bad_metric() {
        let record = RawRecord::new(NaiveDate::from_ymd_opt(2013, 4, 1).unwrap())
            .with_metric("visits", "lots");
        assert!(metric_special_fields(&record).is_err());
    }

    #[test]
    fn derived_fields_can_carry_milliseconds() {
        let record = RawRecord::new(NaiveDate::from_ymd_opt(2013, 4, 1).unwrap())
            .with_metric(SESSION_DURATION_METRIC, "12")
            .with_metric("visits", "12");
        let fields = metric_special_fields_with_durations(&record).unwrap();
        assert_eq!(fields.get(SESSION_DURATION_METRIC), Some(&Value::Integer(12_000)));
        assert_eq!(fields.get("visits"), Some(&Value::Integer(12)));
    }

    #[test]
    fn session_durations_become_milliseconds() {
        assert_eq!(
            convert_durations(SESSION_DURATION_METRIC, Value::Float(1.5)),
            Value::Float(1500.0)
        );
        assert_eq!(
            convert_durations(SESSION_DURATION_METRIC, Value::Integer(0)),
            Value::Integer(0)
        );
        assert_eq!(
            convert_durations("visits", Value::Integer(3)),
            Value::Integer(3)
        );
    }
}
