//! Multi-value (`<base>_<index>`) mapping entries.

use std::sync::LazyLock;

use collector_model::{Document, FieldMapping, Value};
use regex::Regex;

/// Separator between parts of a multi-valued provider field.
pub const MULTI_VALUE_DELIMITER: char = ':';

static MULTI_VALUE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*)_(\d+)$").expect("multi-value key pattern is valid")
});

/// A mapping source key parsed as `<base>_<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiValueKey<'a> {
    pub base: &'a str,
    pub index: usize,
}

impl<'a> MultiValueKey<'a> {
    /// Parse `source`; the base is everything before the last `_` that is
    /// followed only by digits.
    pub fn parse(source: &'a str) -> Option<Self> {
        let captures = MULTI_VALUE_KEY.captures(source)?;
        let base = captures.get(1)?.as_str();
        let index = captures.get(2)?.as_str().parse().ok()?;
        Some(Self { base, index })
    }

    /// The `index`-th part of `value`, if there is one.
    pub fn select<'v>(&self, value: &'v str) -> Option<&'v str> {
        value.split(MULTI_VALUE_DELIMITER).nth(self.index)
    }
}

/// Run the multi-value pass of a mapping over `record`.
///
/// A missing base key, a non-string base value, or an index past the last
/// part all produce no output field.
pub fn map_multi_value_fields(mapping: &FieldMapping, record: &Document) -> Document {
    let mut mapped = Document::new();
    for (source, target) in mapping.iter() {
        let Some(key) = MultiValueKey::parse(source) else {
            continue;
        };
        let Some(value) = record.get(key.base).and_then(Value::as_str) else {
            continue;
        };
        if let Some(part) = key.select(value) {
            for target_key in target.keys() {
                mapped.insert(target_key.clone(), Value::from(part));
            }
        }
    }
    mapped
}
