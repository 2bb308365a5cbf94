//! Document assembly.
//!
//! Each raw record becomes one document built from four ordered layers,
//! later layers overwriting earlier ones on key collision:
//!
//! 1. base metadata (`_timestamp`, `timeSpan`, `dataType`)
//! 2. caller-supplied additional fields
//! 3. the record's dimensions
//! 4. the record's special fields
//!
//! The merged document is passed through the field mapping, then identity is
//! derived from the mapped result.

use std::fmt;

use chrono::NaiveTime;
use collector_map::apply_mapping;
use collector_model::{
    CollectorError, Document, FieldMapping, IdFields, Period, RawRecord, Result, Value, keys,
};
use tracing::{debug, error};

use crate::identity;

/// Name of a merge layer, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerName {
    Base,
    AdditionalFields,
    Dimensions,
    SpecialFields,
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Base => "base",
            Self::AdditionalFields => "additional_fields",
            Self::Dimensions => "dimensions",
            Self::SpecialFields => "special_fields",
        })
    }
}

/// Named field layers applied in the order they were pushed.
#[derive(Debug, Clone, Default)]
pub struct MergeLayers {
    layers: Vec<(LayerName, Document)>,
}

impl MergeLayers {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_layer(mut self, name: LayerName, fields: Document) -> Self {
        self.layers.push((name, fields));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = LayerName> + '_ {
        self.layers.iter().map(|(name, _)| *name)
    }

    /// Flatten the layers; a later layer's value replaces an earlier one.
    pub fn merge(&self) -> Document {
        let mut merged = Document::new();
        for (name, fields) in &self.layers {
            for (key, value) in fields {
                if let Some(previous) = merged.insert(key.clone(), value.clone()) {
                    if previous != *value {
                        debug!(layer = %name, key = %key, "layer overrides earlier value");
                    }
                }
            }
        }
        merged
    }
}

/// Everything about a job that shapes its documents.
#[derive(Debug, Clone)]
pub struct AssemblyConfig {
    pub data_type: Option<String>,
    pub mapping: FieldMapping,
    pub id_fields: Option<IdFields>,
    pub period: Period,
    pub additional_fields: Document,
}

impl AssemblyConfig {
    pub fn new(data_type: impl Into<String>, period: Period) -> Self {
        Self {
            data_type: Some(data_type.into()),
            mapping: FieldMapping::default(),
            id_fields: None,
            period,
            additional_fields: Document::new(),
        }
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    #[must_use]
    pub fn with_id_fields(mut self, id_fields: impl Into<IdFields>) -> Self {
        self.id_fields = Some(id_fields.into());
        self
    }

    #[must_use]
    pub fn with_additional_fields(mut self, fields: Document) -> Self {
        self.additional_fields = fields;
        self
    }
}

/// Build one document from a record and its aligned special fields.
pub fn build_document(
    record: &RawRecord,
    special_fields: &Document,
    config: &AssemblyConfig,
) -> Result<Document> {
    let data_type = config
        .data_type
        .as_deref()
        .ok_or(CollectorError::MissingDataType)?;
    let start = record.start_date.and_time(NaiveTime::MIN).and_utc();

    let mut base = Document::new();
    base.insert(keys::TIMESTAMP.to_string(), Value::Timestamp(start));
    base.insert(
        keys::TIME_SPAN.to_string(),
        Value::from(config.period.as_str()),
    );
    base.insert(keys::DATA_TYPE.to_string(), Value::from(data_type));

    let dimensions: Document = record
        .dimensions
        .iter()
        .map(|(name, value)| (name.clone(), Value::from(value.as_str())))
        .collect();

    let merged = MergeLayers::new()
        .with_layer(LayerName::Base, base)
        .with_layer(LayerName::AdditionalFields, config.additional_fields.clone())
        .with_layer(LayerName::Dimensions, dimensions)
        .with_layer(LayerName::SpecialFields, special_fields.clone())
        .merge();

    let mut document = apply_mapping(&config.mapping, &merged);

    let dimension_values: Vec<&str> = record.dimension_values().collect();
    let identity = identity::derive(
        &document,
        config.id_fields.as_ref().map(IdFields::keys),
        Some(data_type),
        start,
        config.period,
        &dimension_values,
    )?;
    identity::attach(&mut document, identity);

    Ok(document)
}

/// Build documents for every record, all or nothing.
///
/// `special_fields` must be positionally aligned with `records`.
pub fn build_document_set(
    records: &[RawRecord],
    special_fields: &[Document],
    config: &AssemblyConfig,
) -> Result<Vec<Document>> {
    if records.len() != special_fields.len() {
        return Err(CollectorError::MisalignedSpecialFields {
            records: records.len(),
            special_fields: special_fields.len(),
        });
    }
    records
        .iter()
        .zip(special_fields)
        .map(|(record, fields)| {
            build_document(record, fields, config).inspect_err(|err| {
                error!(
                    start_date = %record.start_date,
                    dimensions = ?record.dimensions,
                    error = %err,
                    "failed to assemble document"
                );
            })
        })
        .collect()
}
