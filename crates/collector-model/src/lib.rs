//! Data model for the analytics collector.
//!
//! Provider records come in as [`RawRecord`]s, leave as flat [`Document`]s
//! keyed by a deterministic [`Identity`]. Everything here is plain data;
//! behaviour lives in `collector-map` and `collector-transform`.

pub mod error;
pub mod ids;
pub mod mapping;
pub mod options;
pub mod period;
pub mod record;
pub mod value;

pub use error::{CollectorError, Result};
pub use ids::{Identity, OpaqueId};
pub use mapping::{FieldMapping, IdFields, MappingTarget};
pub use options::{CollectorOptions, DEFAULT_CHUNK_SIZE, QueryOptions};
pub use period::{Frequency, Period, TimeWindow};
pub use record::RawRecord;
pub use value::{Document, ID_TIMESTAMP_FORMAT, Value};

/// Reserved document keys written by the assembler.
pub mod keys {
    pub const TIMESTAMP: &str = "_timestamp";
    pub const TIME_SPAN: &str = "timeSpan";
    pub const DATA_TYPE: &str = "dataType";
    pub const ID: &str = "_id";
    pub const HUMAN_ID: &str = "humanId";
}
