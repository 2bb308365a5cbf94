//! Grouping aggregation over document lists.
//!
//! Documents are grouped on every key of the first document except the
//! aggregated ones. Each group emits one document: a copy of its first member
//! with the aggregated keys replaced.

use std::cmp::Ordering;

use collector_model::{CollectorError, Document, Result, Value};
use tracing::debug;

use super::parser::{Arg, PluginCall};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    /// Total of `key` across the group.
    Sum { key: String },
    /// Mean of `rate_key` weighted by `count_key`.
    Rate { rate_key: String, count_key: String },
}

impl Aggregation {
    /// The key this aggregation writes.
    pub fn key(&self) -> &str {
        match self {
            Self::Sum { key } => key,
            Self::Rate { rate_key, .. } => rate_key,
        }
    }

    /// Resolve `aggregate_count("k")` / `aggregate_rate("r", "c")`.
    pub fn from_call(call: &PluginCall) -> Result<Self> {
        let strings: Option<Vec<&str>> = call.args.iter().map(Arg::as_str).collect();
        let invalid = |message: &str| CollectorError::InvalidPluginArguments {
            plugin: call.name.clone(),
            message: message.to_string(),
        };
        let strings = strings.ok_or_else(|| invalid("arguments must be strings"))?;
        match (call.name.as_str(), strings.as_slice()) {
            ("aggregate_count" | "sum", [key]) => Ok(Self::Sum {
                key: (*key).to_string(),
            }),
            ("aggregate_count" | "sum", _) => Err(invalid("expected one key")),
            ("aggregate_rate" | "rate", [rate_key, count_key]) => Ok(Self::Rate {
                rate_key: (*rate_key).to_string(),
                count_key: (*count_key).to_string(),
            }),
            ("aggregate_rate" | "rate", _) => Err(invalid("expected a rate key and a count key")),
            (name, _) => Err(CollectorError::UnknownPlugin {
                name: name.to_string(),
            }),
        }
    }

    fn apply(&self, group: &[&Document]) -> Result<Value> {
        match self {
            Self::Sum { key } => sum(group, key),
            Self::Rate {
                rate_key,
                count_key,
            } => weighted_rate(group, rate_key, count_key),
        }
    }
}

/// Group `documents` and collapse each group with `aggregations`.
pub fn aggregate(documents: &[Document], aggregations: &[Aggregation]) -> Result<Vec<Document>> {
    let Some(first) = documents.first() else {
        return Ok(Vec::new());
    };
    let group_keys: Vec<&String> = first
        .keys()
        .filter(|key| aggregations.iter().all(|agg| agg.key() != key.as_str()))
        .collect();

    let mut keyed = documents
        .iter()
        .map(|document| {
            let values = group_keys
                .iter()
                .map(|key| {
                    document
                        .get(key.as_str())
                        .ok_or_else(|| CollectorError::missing_key(key.as_str()))
                })
                .collect::<Result<Vec<&Value>>>()?;
            Ok((values, document))
        })
        .collect::<Result<Vec<_>>>()?;
    // Stable, so each group keeps its members' input order.
    keyed.sort_by(|(left, _), (right, _)| compare_keys(left, right));

    let mut output = Vec::new();
    let mut rest = keyed.as_slice();
    while let Some((head_key, _)) = rest.first() {
        let len = rest
            .iter()
            .take_while(|(key, _)| compare_keys(key, head_key) == Ordering::Equal)
            .count();
        let (group, tail) = rest.split_at(len);
        let members: Vec<&Document> = group.iter().map(|(_, document)| *document).collect();

        let mut collapsed = members[0].clone();
        for aggregation in aggregations {
            collapsed.insert(aggregation.key().to_string(), aggregation.apply(&members)?);
        }
        output.push(collapsed);
        rest = tail;
    }

    debug!(
        input = documents.len(),
        groups = output.len(),
        "aggregated documents"
    );
    Ok(output)
}

fn compare_keys(left: &[&Value], right: &[&Value]) -> Ordering {
    left.iter()
        .zip(right)
        .map(|(a, b)| a.total_cmp(b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn numeric<'a>(document: &'a Document, key: &str) -> Result<&'a Value> {
    let value = document
        .get(key)
        .ok_or_else(|| CollectorError::missing_key(key))?;
    if value.is_numeric() {
        Ok(value)
    } else {
        Err(CollectorError::not_numeric(value.to_string()))
    }
}

/// Integer if every addend is an integer and the total fits in `i64`,
/// float otherwise.
fn sum(group: &[&Document], key: &str) -> Result<Value> {
    let mut int_total: Option<i64> = Some(0);
    let mut float_total = 0.0;
    for document in group {
        match numeric(document, key)? {
            Value::Integer(value) => {
                int_total = int_total.and_then(|total| total.checked_add(*value));
                float_total += *value as f64;
            }
            other => {
                int_total = None;
                float_total += other.as_f64().unwrap_or_default();
            }
        }
    }
    Ok(match int_total {
        Some(total) => Value::Integer(total),
        None => Value::Float(float_total),
    })
}

fn weighted_rate(group: &[&Document], rate_key: &str, count_key: &str) -> Result<Value> {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for document in group {
        let rate = numeric(document, rate_key)?.as_f64().unwrap_or_default();
        let count = numeric(document, count_key)?.as_f64().unwrap_or_default();
        weighted += rate * count;
        total += count;
    }
    if total == 0.0 {
        return Err(CollectorError::ZeroWeight {
            rate_key: rate_key.to_string(),
            count_key: count_key.to_string(),
        });
    }
    Ok(Value::Float(weighted / total))
}
