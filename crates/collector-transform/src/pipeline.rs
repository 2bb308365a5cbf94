//! The parser facade a collection job drives.

use collector_model::{CollectorOptions, Document, Frequency, RawRecord, Result};
use tracing::info;

use crate::assemble::{AssemblyConfig, build_document_set};
use crate::plugins::PluginChain;

/// Assembly settings plus the post-processing chain for one job.
#[derive(Debug, Clone)]
pub struct DataParser {
    config: AssemblyConfig,
    plugins: PluginChain,
}

impl DataParser {
    /// Resolve a parser from job options.
    ///
    /// `options.data_type` overrides `data_set_type`. Plugin specifications
    /// are parsed and the chain validated here, before any record is seen.
    pub fn new(
        options: &CollectorOptions,
        data_set_type: Option<&str>,
        frequency: Frequency,
    ) -> Result<Self> {
        let plugins = match &options.plugins {
            Some(specs) => PluginChain::parse(specs.as_slice())?,
            None => PluginChain::default(),
        };
        let config = AssemblyConfig {
            data_type: options
                .data_type
                .clone()
                .or_else(|| data_set_type.map(str::to_string)),
            mapping: options.mappings.clone(),
            id_fields: options.id_mapping.clone(),
            period: frequency.period(),
            additional_fields: options.additional_fields.clone(),
        };
        Ok(Self { config, plugins })
    }

    pub fn from_parts(config: AssemblyConfig, plugins: PluginChain) -> Self {
        Self { config, plugins }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn plugins(&self) -> &PluginChain {
        &self.plugins
    }

    /// Assemble every record, then run the plugin chain over the result.
    pub fn get_data(
        &self,
        records: &[RawRecord],
        special_fields: &[Document],
    ) -> Result<Vec<Document>> {
        let documents = build_document_set(records, special_fields, &self.config)?;
        let documents = self.plugins.run(documents)?;
        info!(
            data_type = self.config.data_type.as_deref().unwrap_or_default(),
            period = %self.config.period,
            records = records.len(),
            documents = documents.len(),
            "parsed records"
        );
        Ok(documents)
    }
}
