//! Handing documents to a data set.
//!
//! The store itself is out of reach; a [`DataSetWriter`] is whatever accepts
//! chunks of documents. [`Pusher`] enforces the submission contract on top.

use std::io::Write;

use collector_model::{DEFAULT_CHUNK_SIZE, Document};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to write documents: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("data set rejected {documents} documents: {message}")]
    Rejected { documents: usize, message: String },
}

pub type PublishResult<T> = std::result::Result<T, PublishError>;

/// A destination that accepts documents in chunks.
pub trait DataSetWriter {
    /// Insert one chunk.
    fn post(&mut self, documents: &[Document]) -> PublishResult<()>;

    /// Delete every document currently in the data set.
    fn empty(&mut self) -> PublishResult<()>;
}

/// What a push did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    pub documents: usize,
    pub chunks: usize,
    pub emptied: bool,
}

/// Submits documents in fixed-size chunks.
#[derive(Debug, Clone, Copy)]
pub struct Pusher {
    chunk_size: usize,
    empty_data_set: bool,
}

impl Default for Pusher {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Pusher {
    /// A chunk size of zero is treated as one.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            empty_data_set: false,
        }
    }

    /// Replace the data set's contents instead of appending to them.
    #[must_use]
    pub fn with_empty_data_set(mut self, empty_data_set: bool) -> Self {
        self.empty_data_set = empty_data_set;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Push `documents` through `writer`.
    ///
    /// An empty list touches nothing, not even a destructive replace.
    pub fn push<W: DataSetWriter + ?Sized>(
        &self,
        writer: &mut W,
        documents: &[Document],
    ) -> PublishResult<PushSummary> {
        let mut summary = PushSummary::default();
        if documents.is_empty() {
            info!("no documents to push");
            return Ok(summary);
        }
        if self.empty_data_set {
            writer.empty()?;
            summary.emptied = true;
        }
        for chunk in documents.chunks(self.chunk_size) {
            writer.post(chunk)?;
            summary.chunks += 1;
            summary.documents += chunk.len();
        }
        info!(
            documents = summary.documents,
            chunks = summary.chunks,
            emptied = summary.emptied,
            "pushed documents"
        );
        Ok(summary)
    }
}

/// Writes each document as one line of JSON.
///
/// `empty` cannot retract lines already written; it is recorded as a marker
/// line so the replace is visible downstream.
#[derive(Debug)]
pub struct JsonLinesWriter<W: Write> {
    inner: W,
}

/// Marker line written by [`JsonLinesWriter::empty`].
pub const EMPTY_MARKER: &str = r#"{"_empty_data_set":true}"#;

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> DataSetWriter for JsonLinesWriter<W> {
    fn post(&mut self, documents: &[Document]) -> PublishResult<()> {
        for document in documents {
            serde_json::to_writer(&mut self.inner, document)?;
            self.inner.write_all(b"\n")?;
        }
        self.inner.flush()?;
        Ok(())
    }

    fn empty(&mut self) -> PublishResult<()> {
        self.inner.write_all(EMPTY_MARKER.as_bytes())?;
        self.inner.write_all(b"\n")?;
        Ok(())
    }
}
