#![deny(unsafe_code)]

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

use crate::error::{CollectorError, Result};

/// Store primary key for a document.
///
/// This is the padded url-safe base64 encoding of the human id's UTF-8
/// bytes. The encoding is injective: distinct human ids never share an
/// opaque id, and [`OpaqueId::decode`] recovers the human id.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct OpaqueId(String);

impl OpaqueId {
    pub fn encode(human_id: &str) -> Self {
        Self(URL_SAFE.encode(human_id.as_bytes()))
    }

    pub fn decode(&self) -> Result<String> {
        let bytes = URL_SAFE
            .decode(&self.0)
            .map_err(|error| CollectorError::InvalidOpaqueId {
                message: error.to_string(),
            })?;
        String::from_utf8(bytes).map_err(|error| CollectorError::InvalidOpaqueId {
            message: error.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic identity of an output document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Identity {
    pub opaque_id: OpaqueId,
    pub human_id: String,
}

impl Identity {
    pub fn from_human_id(human_id: impl Into<String>) -> Self {
        let human_id = human_id.into();
        Self {
            opaque_id: OpaqueId::encode(&human_id),
            human_id,
        }
    }
}
