use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while bucketing, assembling or post-processing documents.
///
/// Every variant is a local, synchronous failure. Nothing inside the
/// pipeline retries; a failure aborts the whole job.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("invalid frequency '{value}': expected day, week or month")]
    InvalidFrequency { value: String },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("date arithmetic from {date} leaves the supported calendar range")]
    DateOutOfRange { date: NaiveDate },

    #[error("a data type must be provided")]
    MissingDataType,

    #[error("unable to use value as int or float: {value:?}")]
    NotNumeric { value: String },

    #[error("document has no key '{key}'")]
    MissingKey { key: String },

    #[error("invalid plugin chain: {message}")]
    InvalidPluginChain { message: String },

    #[error("special fields ({special_fields}) are not aligned with records ({records})")]
    MisalignedSpecialFields {
        records: usize,
        special_fields: usize,
    },

    #[error("cannot parse plugin '{spec}': {message}")]
    PluginSyntax { spec: String, message: String },

    #[error("unknown plugin '{name}'")]
    UnknownPlugin { name: String },

    #[error("invalid arguments for {plugin}: {message}")]
    InvalidPluginArguments { plugin: String, message: String },

    #[error("cannot aggregate rate '{rate_key}': total of '{count_key}' is zero")]
    ZeroWeight { rate_key: String, count_key: String },

    #[error("opaque id is not valid url-safe base64: {message}")]
    InvalidOpaqueId { message: String },
}

impl CollectorError {
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    pub fn not_numeric(value: impl Into<String>) -> Self {
        Self::NotNumeric {
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CollectorError>;
