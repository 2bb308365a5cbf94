//! Field mapping for collector documents.
//!
//! A [`FieldMapping`] is applied in two passes over the same input:
//!
//! - **one-to-one**: each key with a direct entry is written to every target
//!   of that entry; keys without an entry pass through unchanged.
//! - **multi-value**: each entry whose source key looks like
//!   `<base>_<index>` splits the input's `<base>` value on `:` and writes the
//!   `index`-th part to the entry's target.
//!
//! Both passes read the original input, so the multi-value pass never sees
//! renamed keys. When both passes write the same target the multi-value
//! result wins. That collision is a configuration hazard: it is logged, not
//! guaranteed.

pub mod multi_value;

use collector_model::{Document, FieldMapping};
use tracing::warn;

pub use multi_value::{MULTI_VALUE_DELIMITER, MultiValueKey, map_multi_value_fields};

/// Apply both mapping passes to `record`.
pub fn apply_mapping(mapping: &FieldMapping, record: &Document) -> Document {
    let mut mapped = map_one_to_one_fields(mapping, record);
    for (key, value) in map_multi_value_fields(mapping, record) {
        if mapped.contains_key(&key) {
            warn!(key = %key, "multi-value mapping overwrites a one-to-one field");
        }
        mapped.insert(key, value);
    }
    mapped
}

/// Rename (or fan out) every key that has a direct mapping entry.
pub fn map_one_to_one_fields(mapping: &FieldMapping, record: &Document) -> Document {
    let mut mapped = Document::new();
    for (key, value) in record {
        match mapping.get(key) {
            Some(target) => {
                for target_key in target.keys() {
                    mapped.insert(target_key.clone(), value.clone());
                }
            }
            None => {
                mapped.insert(key.clone(), value.clone());
            }
        }
    }
    mapped
}
