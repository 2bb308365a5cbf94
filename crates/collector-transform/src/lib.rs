//! Normalization pipeline for analytics collector records.
//!
//! # Overview
//!
//! - **Calendar bucketing** ([`calendar`]): split a date range into day,
//!   week or month windows
//! - **Assembly** ([`assemble`]): merge a record's layers, apply the field
//!   mapping and attach a deterministic identity
//! - **Plugins** ([`plugins`]): ordered post-processing over document lists
//! - **Publishing** ([`publish`]): chunked submission to a data set
//!
//! [`DataParser`] ties assembly and plugins together for one job.
//!
//! # Example
//!
//! ```ignore
//! use collector_transform::{DataParser, calendar, metric_special_fields};
//!
//! let windows = calendar::period_range(Frequency::Weekly, start, end, today)?;
//! let records = query_for_range(&source, &windows)?;
//! let special = records.iter().map(metric_special_fields).collect::<Result<Vec<_>>>()?;
//! let parser = DataParser::new(&options, Some("visitors"), Frequency::Weekly)?;
//! let documents = parser.get_data(&records, &special)?;
//! ```

pub mod assemble;
pub mod calendar;
pub mod identity;
pub mod numeric;
pub mod pipeline;
pub mod plugins;
pub mod publish;
pub mod source;

pub use assemble::{AssemblyConfig, LayerName, MergeLayers, build_document, build_document_set};
pub use calendar::{bucket, period_range};
pub use numeric::{
    convert_durations, metric_special_fields, metric_special_fields_with_durations, try_number,
};
pub use pipeline::DataParser;
pub use plugins::{Aggregation, Plugin, PluginChain};
pub use publish::{DataSetWriter, JsonLinesWriter, PublishError, PushSummary, Pusher};
pub use source::{RecordSource, query_for_range};
