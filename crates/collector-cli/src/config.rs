//! Job files and record files.
//!
//! A job file is JSON:
//!
//! ```json
//! {
//!   "data-set": { "data-group": "govuk", "data-type": "visitors" },
//!   "query": { "frequency": "weekly", "empty_data_set": false },
//!   "options": { "mappings": {}, "plugins": [], "chunk-size": 100 }
//! }
//! ```
//!
//! A records file is either a JSON list of records or an object with
//! `records` and an optional, positionally aligned `special_fields` list.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use collector_model::{
    CollectorOptions, Document, Frequency, QueryOptions, RawRecord, TimeWindow,
};
use collector_transform::{
    DataParser, Pusher, RecordSource, metric_special_fields, metric_special_fields_with_durations,
};
use serde::Deserialize;

/// Identifies the data set documents are pushed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DataSetConfig {
    #[serde(rename = "data-group", default)]
    pub data_group: Option<String>,
    #[serde(rename = "data-type", default)]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobConfig {
    #[serde(rename = "data-set", default)]
    pub data_set: DataSetConfig,
    #[serde(default)]
    pub query: QueryOptions,
    #[serde(default)]
    pub options: CollectorOptions,
}

impl JobConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read job file {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("parse job file {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn frequency(&self) -> Frequency {
        self.query.frequency
    }

    /// `options.dataType` if set, else the data set's own type.
    pub fn data_type(&self) -> Option<&str> {
        self.options
            .data_type
            .as_deref()
            .or(self.data_set.data_type.as_deref())
    }

    /// Resolve the parser; fails on a bad plugin configuration.
    pub fn parser(&self) -> collector_model::Result<DataParser> {
        DataParser::new(
            &self.options,
            self.data_set.data_type.as_deref(),
            self.query.frequency,
        )
    }

    /// Load the records this job collects, honoring `convertDurations`.
    pub fn load_records(&self, path: &Path) -> Result<RecordBatch> {
        if self.options.convert_durations {
            RecordBatch::load_with(path, metric_special_fields_with_durations)
        } else {
            RecordBatch::load(path)
        }
    }

    pub fn pusher(&self) -> Pusher {
        Pusher::new(self.options.chunk_size).with_empty_data_set(self.query.empty_data_set)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    Plain(Vec<RawRecord>),
    WithSpecialFields {
        records: Vec<RawRecord>,
        #[serde(default)]
        special_fields: Option<Vec<Document>>,
    },
}

/// Derives a record's special fields from its metrics.
pub type SpecialFieldsFn = fn(&RawRecord) -> collector_model::Result<Document>;

/// Records with their aligned special fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    pub records: Vec<RawRecord>,
    pub special_fields: Vec<Document>,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, metric_special_fields)
    }

    pub fn load_with(path: &Path, derive: SpecialFieldsFn) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read records file {}", path.display()))?;
        Self::from_json_with(&contents, derive)
            .with_context(|| format!("parse records file {}", path.display()))
    }

    /// Parse a records file. Missing special fields are derived by coercing
    /// each record's metrics to numbers.
    pub fn from_json(contents: &str) -> Result<Self> {
        Self::from_json_with(contents, metric_special_fields)
    }

    /// Parse a records file, deriving missing special fields with `derive`.
    /// Explicit special fields are used as given.
    pub fn from_json_with(contents: &str, derive: SpecialFieldsFn) -> Result<Self> {
        let (records, special_fields) = match serde_json::from_str(contents)? {
            RecordsFile::Plain(records) => (records, None),
            RecordsFile::WithSpecialFields {
                records,
                special_fields,
            } => (records, special_fields),
        };
        let special_fields = match special_fields {
            Some(fields) => {
                if fields.len() != records.len() {
                    bail!(
                        "{} special field entries for {} records",
                        fields.len(),
                        records.len()
                    );
                }
                fields
            }
            None => records
                .iter()
                .map(derive)
                .collect::<collector_model::Result<Vec<_>>>()
                .context("coerce record metrics")?,
        };
        Ok(Self {
            records,
            special_fields,
        })
    }

    pub fn into_source(self) -> FileRecordSource {
        FileRecordSource { batch: self }
    }
}

/// Serves records already loaded from a file, selected by start date.
#[derive(Debug, Clone)]
pub struct FileRecordSource {
    batch: RecordBatch,
}

impl RecordSource for FileRecordSource {
    type Record = (RawRecord, Document);
    type Error = std::convert::Infallible;

    fn fetch(&self, window: &TimeWindow) -> std::result::Result<Vec<Self::Record>, Self::Error> {
        Ok(self
            .batch
            .records
            .iter()
            .zip(&self.batch.special_fields)
            .filter(|(record, _)| window.contains(record.start_date))
            .map(|(record, fields)| (record.clone(), fields.clone()))
            .collect())
    }
}

impl FromIterator<(RawRecord, Document)> for RecordBatch {
    fn from_iter<I: IntoIterator<Item = (RawRecord, Document)>>(iter: I) -> Self {
        let (records, special_fields) = iter.into_iter().unzip();
        Self {
            records,
            special_fields,
        }
    }
}
