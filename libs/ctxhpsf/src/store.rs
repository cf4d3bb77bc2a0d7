//! Access to the property set streams of a compound document
//!
//! The container itself (sectors, directory) is handled elsewhere: all this module
//! needs is whole-stream read and write access, see [`DocumentStore`].
use crate::config::CodecOptions;
use crate::doc_summary::DocumentSummaryInformation;
use crate::error::HpsfError;
use crate::property_set::PropertySet;
use crate::summary::SummaryInformation;
use crate::{DOCUMENT_SUMMARY_INFORMATION_STREAM, SUMMARY_INFORMATION_STREAM};
use std::collections::BTreeMap;
use tracing::debug;

/// Named streams of a compound document
pub trait DocumentStore {
    /// Returns the content of stream `name`, or `None` if it doesn't exist
    fn open_stream(&self, name: &str) -> Result<Option<Vec<u8>>, HpsfError>;

    /// Creates stream `name` with content `data`, replacing any existing one
    fn create_or_replace_stream(&mut self, name: &str, data: &[u8]) -> Result<(), HpsfError>;

    /// Lists the stream names
    fn stream_names(&self) -> Vec<String>;
}

/// A [`DocumentStore`] held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    streams: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn open_stream(&self, name: &str) -> Result<Option<Vec<u8>>, HpsfError> {
        Ok(self.streams.get(name).cloned())
    }

    fn create_or_replace_stream(&mut self, name: &str, data: &[u8]) -> Result<(), HpsfError> {
        self.streams.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn stream_names(&self) -> Vec<String> {
        self.streams.keys().cloned().collect()
    }
}

/// Reads the SummaryInformation stream, if present
pub fn read_summary_information<S: DocumentStore + ?Sized>(
    store: &S,
    options: &CodecOptions,
) -> Result<Option<SummaryInformation>, HpsfError> {
    match store.open_stream(SUMMARY_INFORMATION_STREAM)? {
        Some(data) => PropertySet::parse_with(&data, options)
            .and_then(SummaryInformation::try_from)
            .map(Some),
        None => Ok(None),
    }
}

/// Reads the DocumentSummaryInformation stream, if present
pub fn read_document_summary_information<S: DocumentStore + ?Sized>(
    store: &S,
    options: &CodecOptions,
) -> Result<Option<DocumentSummaryInformation>, HpsfError> {
    match store.open_stream(DOCUMENT_SUMMARY_INFORMATION_STREAM)? {
        Some(data) => PropertySet::parse_with(&data, options)
            .and_then(DocumentSummaryInformation::try_from)
            .map(Some),
        None => Ok(None),
    }
}

/// Writes the given property sets to their streams
///
/// Both are serialized before any stream is touched.
pub fn write_property_sets<S: DocumentStore + ?Sized>(
    store: &mut S,
    summary: Option<&SummaryInformation>,
    doc_summary: Option<&DocumentSummaryInformation>,
) -> Result<(), HpsfError> {
    let summary = summary
        .map(|si| si.property_set().to_bytes())
        .transpose()?;
    let doc_summary = doc_summary
        .map(|dsi| dsi.property_set().to_bytes())
        .transpose()?;
    if let Some(data) = summary {
        store.create_or_replace_stream(SUMMARY_INFORMATION_STREAM, &data)?;
    }
    if let Some(data) = doc_summary {
        store.create_or_replace_stream(DOCUMENT_SUMMARY_INFORMATION_STREAM, &data)?;
    }
    Ok(())
}

/// Returns the names of the streams which look like property sets
pub fn find_property_sets<S: DocumentStore + ?Sized>(store: &S) -> Vec<String> {
    store
        .stream_names()
        .into_iter()
        .filter(|name| match store.open_stream(name) {
            Ok(Some(data)) => PropertySet::is_property_set_stream(&data),
            Ok(None) => false,
            Err(e) => {
                debug!("Cannot open stream {name:?}: {e}");
                false
            }
        })
        .collect()
}
