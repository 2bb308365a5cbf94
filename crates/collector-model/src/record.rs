use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One data point returned by a provider query, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Dimension values keyed by dimension name. Iteration order is by key,
    /// which is also the order dimension values enter fallback identities.
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
    #[serde(default)]
    pub metrics: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date: None,
            dimensions: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn with_dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metrics.insert(name.into(), value.into());
        self
    }

    /// Dimension values in key order.
    pub fn dimension_values(&self) -> impl Iterator<Item = &str> {
        self.dimensions.values().map(String::as_str)
    }
}
