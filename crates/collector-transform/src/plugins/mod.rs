//! Post-processing plugins.
//!
//! Plugins are configured as textual call specifications, e.g.
//! `RemoveKey("customVarValue9")` or
//! `AggregateKey(aggregate_count("visits"))`. Each specification is parsed
//! (never evaluated) and resolved against a fixed set of known plugins.
//! A chain runs its plugins in order over the full document list.

mod aggregate;
mod parser;

pub use aggregate::{Aggregation, aggregate};
pub use parser::{Arg, PluginCall, parse_plugin_call};

use collector_model::{CollectorError, Document, Result, Value};
use tracing::{debug, error, info};

use crate::identity;

/// A resolved plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plugin {
    /// Delete the keys from every document. A missing key is an error.
    RemoveKey { keys: Vec<String> },
    /// Recompute `_id`/`humanId` from the listed fields joined by `_`.
    ComputeIdFrom { fields: Vec<String> },
    /// Write each document's 1-based position into `field`.
    ComputeRank { field: String },
    /// Group and collapse documents.
    AggregateKey { aggregations: Vec<Aggregation> },
    /// Does nothing; lets configuration carry notes.
    Comment,
}

impl Plugin {
    /// Parse and resolve one specification.
    pub fn parse(spec: &str) -> Result<Self> {
        Self::from_call(&parse_plugin_call(spec)?)
    }

    pub fn from_call(call: &PluginCall) -> Result<Self> {
        let invalid = |message: &str| CollectorError::InvalidPluginArguments {
            plugin: call.name.clone(),
            message: message.to_string(),
        };
        match call.name.as_str() {
            "RemoveKey" => Ok(Self::RemoveKey {
                keys: string_args(call).ok_or_else(|| invalid("keys must be strings"))?,
            }),
            "ComputeIdFrom" => {
                let fields =
                    string_args(call).ok_or_else(|| invalid("field names must be strings"))?;
                if fields.is_empty() {
                    return Err(invalid("at least one field is required"));
                }
                Ok(Self::ComputeIdFrom { fields })
            }
            "ComputeRank" => match string_args(call).as_deref() {
                Some([field]) => Ok(Self::ComputeRank {
                    field: field.clone(),
                }),
                _ => Err(invalid("expected exactly one field name")),
            },
            "AggregateKey" => {
                let aggregations = call
                    .args
                    .iter()
                    .map(|arg| {
                        arg.as_call()
                            .ok_or_else(|| invalid("arguments must be aggregation calls"))
                            .and_then(Aggregation::from_call)
                    })
                    .collect::<Result<Vec<_>>>()?;
                if aggregations.is_empty() {
                    return Err(invalid("at least one aggregation is required"));
                }
                Ok(Self::AggregateKey { aggregations })
            }
            "Comment" => Ok(Self::Comment),
            name => Err(CollectorError::UnknownPlugin {
                name: name.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RemoveKey { .. } => "RemoveKey",
            Self::ComputeIdFrom { .. } => "ComputeIdFrom",
            Self::ComputeRank { .. } => "ComputeRank",
            Self::AggregateKey { .. } => "AggregateKey",
            Self::Comment => "Comment",
        }
    }

    /// Transform a whole document list.
    pub fn apply(&self, mut documents: Vec<Document>) -> Result<Vec<Document>> {
        match self {
            Self::RemoveKey { keys } => {
                for document in &mut documents {
                    for key in keys {
                        if document.remove(key).is_none() {
                            error!(
                                key = %key,
                                human_id = ?document.get(collector_model::keys::HUMAN_ID),
                                timestamp = ?document.get(collector_model::keys::TIMESTAMP),
                                "document is missing a key to remove"
                            );
                            return Err(CollectorError::missing_key(key.as_str()));
                        }
                    }
                }
                Ok(documents)
            }
            Self::ComputeIdFrom { fields } => {
                for document in &mut documents {
                    let identity =
                        identity::fields_id(document, fields, identity::COMPOSITE_SEPARATOR);
                    identity::attach(document, identity);
                }
                Ok(documents)
            }
            Self::ComputeRank { field } => {
                for (rank, document) in (1_i64..).zip(documents.iter_mut()) {
                    document.insert(field.clone(), Value::Integer(rank));
                }
                Ok(documents)
            }
            Self::AggregateKey { aggregations } => aggregate(&documents, aggregations),
            Self::Comment => Ok(documents),
        }
    }
}

fn string_args(call: &PluginCall) -> Option<Vec<String>> {
    call.args
        .iter()
        .map(|arg| arg.as_str().map(str::to_string))
        .collect()
}

/// An ordered, validated list of plugins.
///
/// A non-empty chain must finish with `ComputeIdFrom`: any earlier plugin may
/// have changed the fields identity was derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginChain {
    plugins: Vec<Plugin>,
}

impl PluginChain {
    pub fn new(plugins: Vec<Plugin>) -> Result<Self> {
        match plugins.last() {
            None | Some(Plugin::ComputeIdFrom { .. }) => Ok(Self { plugins }),
            Some(last) => Err(CollectorError::InvalidPluginChain {
                message: format!(
                    "the last plugin must be ComputeIdFrom, found {}",
                    last.name()
                ),
            }),
        }
    }

    /// Parse every specification, then validate the chain.
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self> {
        let plugins = specs
            .iter()
            .map(|spec| Plugin::parse(spec.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(plugins)
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn run(&self, documents: Vec<Document>) -> Result<Vec<Document>> {
        if self.plugins.is_empty() {
            return Ok(documents);
        }
        let input = documents.len();
        let mut documents = documents;
        for plugin in &self.plugins {
            documents = plugin.apply(documents).inspect_err(|err| {
                error!(plugin = plugin.name(), input, error = %err, "plugin failed");
            })?;
            debug!(plugin = plugin.name(), documents = documents.len(), "applied plugin");
        }
        info!(
            plugins = self.plugins.len(),
            input,
            output = documents.len(),
            "ran plugin chain"
        );
        Ok(documents)
    }
}
