//! Per-job collection options.

use serde::{Deserialize, Serialize};

use crate::mapping::{FieldMapping, IdFields};
use crate::period::Frequency;
use crate::value::Document;

/// Default number of documents posted per request.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Query-level settings that shape bucketing and publishing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub frequency: Frequency,

    /// Replace the whole data set before inserting.
    #[serde(default)]
    pub empty_data_set: bool,
}

/// Options controlling how raw records become documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorOptions {
    /// Overrides the data set's own data type.
    #[serde(rename = "dataType", default)]
    pub data_type: Option<String>,

    #[serde(default)]
    pub mappings: FieldMapping,

    #[serde(rename = "idMapping", default)]
    pub id_mapping: Option<IdFields>,

    #[serde(rename = "additionalFields", default)]
    pub additional_fields: Document,

    /// Plugin specifications, applied in order after assembly.
    #[serde(default)]
    pub plugins: Option<Vec<String>>,

    #[serde(rename = "chunk-size", default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Rescale session durations from seconds to milliseconds when special
    /// fields are derived from record metrics.
    #[serde(rename = "convertDurations", default)]
    pub convert_durations: bool,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            data_type: None,
            mappings: FieldMapping::default(),
            id_mapping: None,
            additional_fields: Document::new(),
            plugins: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            convert_durations: false,
        }
    }
}

impl CollectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mappings(mut self, mappings: FieldMapping) -> Self {
        self.mappings = mappings;
        self
    }

    #[must_use]
    pub fn with_id_mapping(mut self, id_mapping: impl Into<IdFields>) -> Self {
        self.id_mapping = Some(id_mapping.into());
        self
    }

    #[must_use]
    pub fn with_additional_fields(mut self, fields: Document) -> Self {
        self.additional_fields = fields;
        self
    }

    #[must_use]
    pub fn with_plugins<S: Into<String>>(mut self, plugins: impl IntoIterator<Item = S>) -> Self {
        self.plugins = Some(plugins.into_iter().map(Into::into).collect());
        self
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
