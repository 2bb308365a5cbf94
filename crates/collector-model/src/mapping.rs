//! Field mapping tables and identity field configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Target of a single mapping entry: one key, or the same value fanned out
/// to several keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingTarget {
    One(String),
    Many(Vec<String>),
}

impl MappingTarget {
    pub fn keys(&self) -> &[String] {
        match self {
            Self::One(key) => std::slice::from_ref(key),
            Self::Many(keys) => keys,
        }
    }
}

impl From<&str> for MappingTarget {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<&str>> for MappingTarget {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// Static per-job mapping from provider keys to output keys.
///
/// Keys of the form `<base>_<index>` additionally act as multi-value split
/// instructions: the `index`-th `:`-delimited part of `<base>` is written to
/// the entry's target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, MappingTarget>);

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str) -> Option<&MappingTarget> {
        self.0.get(source)
    }

    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<MappingTarget>) {
        self.0.insert(source.into(), target.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingTarget)> {
        self.0.iter().map(|(source, target)| (source.as_str(), target))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMapping
where
    K: Into<String>,
    V: Into<MappingTarget>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(source, target)| (source.into(), target.into()))
                .collect(),
        )
    }
}

/// Explicit identity fields: a single key or an ordered list of keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdFields {
    Single(String),
    Many(Vec<String>),
}

impl IdFields {
    pub fn keys(&self) -> &[String] {
        match self {
            Self::Single(key) => std::slice::from_ref(key),
            Self::Many(keys) => keys,
        }
    }
}

impl From<&str> for IdFields {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<&str>> for IdFields {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}
