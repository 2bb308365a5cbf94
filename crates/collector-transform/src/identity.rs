//! Deterministic document identity.
//!
//! A document's `humanId` is built either from an explicit list of its own
//! fields or, failing that, from a composite of data type, timestamp, period
//! and the provider's dimension values. `_id` is the url-safe base64 of the
//! `humanId` bytes (see [`collector_model::OpaqueId`]).

use chrono::{DateTime, Utc};
use collector_model::{
    CollectorError, Document, ID_TIMESTAMP_FORMAT, Identity, Period, Result, Value, keys,
};
use tracing::debug;

/// Separator between parts of a fallback composite id.
pub const COMPOSITE_SEPARATOR: &str = "_";

/// Compute identity for a mapped document.
///
/// With `explicit_fields`, the id is the concatenation of those fields'
/// values with no delimiter. Otherwise the fallback composite is used.
pub fn derive(
    document: &Document,
    explicit_fields: Option<&[String]>,
    data_type: Option<&str>,
    timestamp: DateTime<Utc>,
    period: Period,
    dimension_values: &[&str],
) -> Result<Identity> {
    match explicit_fields {
        Some(fields) => Ok(fields_id(document, fields, "")),
        None => {
            let data_type = data_type
                .filter(|value| !value.is_empty())
                .ok_or(CollectorError::MissingDataType)?;
            Ok(data_id(data_type, timestamp, period, dimension_values))
        }
    }
}

/// Identity from the composite `dataType_timestamp_period_dim1_dim2...`.
pub fn data_id(
    data_type: &str,
    timestamp: DateTime<Utc>,
    period: Period,
    dimension_values: &[&str],
) -> Identity {
    let formatted = format_timestamp(timestamp);
    let mut parts = vec![data_type, formatted.as_str(), period.as_str()];
    parts.extend_from_slice(dimension_values);
    value_id(&parts.join(COMPOSITE_SEPARATOR))
}

/// Identity from a document's own fields, joined by `separator`.
///
/// A field missing from the document contributes an empty string.
pub fn fields_id(document: &Document, fields: &[String], separator: &str) -> Identity {
    let parts: Vec<String> = fields
        .iter()
        .map(|field| document.get(field).map(Value::to_string).unwrap_or_default())
        .collect();
    value_id(&parts.join(separator))
}

pub fn value_id(human_id: &str) -> Identity {
    debug!(human_id = %human_id, "derived document identity");
    Identity::from_human_id(human_id)
}

/// `YYYYMMDDHHMMSS` in UTC.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(ID_TIMESTAMP_FORMAT).to_string()
}

/// Write `_id` and `humanId` onto `document`.
pub fn attach(document: &mut Document, identity: Identity) {
    let Identity {
        opaque_id,
        human_id,
    } = identity;
    document.insert(keys::ID.to_string(), Value::String(opaque_id.into_string()));
    document.insert(keys::HUMAN_ID.to_string(), Value::String(human_id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn composite_identity() {
        let identity = data_id("a", noon(), Period::Week, &["one", "two"]);
        assert_eq!(identity.human_id, "a_20120101120000_week_one_two");
        assert_eq!(
            identity.opaque_id.as_str(),
            "YV8yMDEyMDEwMTEyMDAwMF93ZWVrX29uZV90d28="
        );
    }

    #[test]
    fn unicode_dimension_values() {
        let identity = data_id("a", noon(), Period::Week, &["one", "© ☯ ☮"]);
        assert_eq!(identity.human_id, "a_20120101120000_week_one_© ☯ ☮");
        assert_eq!(
            identity.opaque_id.as_str(),
            "YV8yMDEyMDEwMTEyMDAwMF93ZWVrX29uZV_CqSDimK8g4piu"
        );
    }

    #[test]
    fn explicit_fields_concatenate_without_delimiter() {
        let mut document = Document::new();
        document.insert("var".to_string(), Value::from("f"));
        document.insert("dataType".to_string(), Value::from("oo"));
        let fields = vec!["var".to_string(), "dataType".to_string()];
        let identity = derive(&document, Some(fields.as_slice()), None, noon(), Period::Week, &[]).unwrap();
        assert_eq!(identity.human_id, "foo");
        assert_eq!(identity.opaque_id.as_str(), "Zm9v");
    }

    #[test]
    fn explicit_timestamp_field_renders_compactly() {
        let mut document = Document::new();
        let date = NaiveDate::from_ymd_opt(2013, 4, 1).unwrap();
        document.insert(keys::TIMESTAMP.to_string(), Value::midnight_utc(date));
        document.insert("name".to_string(), Value::from("x"));
        let fields = vec![keys::TIMESTAMP.to_string(), "name".to_string()];
        let identity = fields_id(&document, &fields, "");
        assert_eq!(identity.human_id, "20130401000000x");
    }

    #[test]
    fn missing_explicit_field_contributes_nothing() {
        let mut document = Document::new();
        document.insert("a".to_string(), Value::Integer(1));
        let fields = vec!["a".to_string(), "gone".to_string(), "a".to_string()];
        assert_eq!(fields_id(&document, &fields, "_").human_id, "1__1");
    }

    #[test]
    fn fallback_requires_data_type() {
        let document = Document::new();
        for data_type in [None, Some("")] {
            let err = derive(&document, None, data_type, noon(), Period::Day, &[]).unwrap_err();
            assert!(matches!(err, CollectorError::MissingDataType));
        }
    }

    #[test]
    fn timestamps_render_compactly() {
        assert_eq!(format_timestamp(noon()), "20120101120000");
    }
}
