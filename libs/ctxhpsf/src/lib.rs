//! # A library to read and write Ole Property Set Streams
//!
//! Property sets carry the metadata of Ole documents: most notably the
//! `\u{5}SummaryInformation` (title, author, dates, ...) and the
//! `\u{5}DocumentSummaryInformation` (company, counts, user defined properties) streams.
//!
//! The implementation follows
//! [\[MS-OLEPS\]](https://docs.microsoft.com/en-us/openspecs/windows_protocols/ms-oleps/bf7aeae8-c47a-4939-9f45-700158dac3bc).
//! Reading is lenient: problems confined to a single property or section can be
//! tolerated (see [`CodecOptions`]) and are reported as anomalies. Writing is strict.
//!
//! See [`PropertySet`] for the generic interface, [`SummaryInformation`] and
//! [`DocumentSummaryInformation`] for named access to the well-known properties.
//!
//! # Examples
//! ```no_run
//! use ctxhpsf::{HpsfError, SummaryInformation};
//!
//! fn retitle(data: &[u8]) -> Result<Vec<u8>, HpsfError> {
//!     let mut si = SummaryInformation::parse(data)?;
//!     println!("Old title: {:?}", si.title());
//!     si.set_title("New title");
//!     si.property_set().to_bytes()
//! }
//! ```

#![warn(missing_docs)]

mod macros;

pub mod classid;
pub mod codepage;
pub mod config;
pub mod custom;
pub mod dictionary;
pub mod doc_summary;
pub mod error;
pub mod property;
pub mod property_ids;
pub mod property_set;
pub mod section;
pub mod store;
pub mod summary;
pub mod thumbnail;
pub mod variant;

pub use classid::ClassId;
pub use config::{CodecOptions, Policy};
pub use custom::CustomProperties;
pub use dictionary::Dictionary;
pub use doc_summary::DocumentSummaryInformation;
pub use error::HpsfError;
pub use property::Property;
pub use property_set::{PropertySet, PropertySetKind};
pub use section::Section;
pub use store::{DocumentStore, MemoryStore};
pub use summary::SummaryInformation;
pub use variant::Variant;

/// Name of the SummaryInformation stream
pub const SUMMARY_INFORMATION_STREAM: &str = "\u{5}SummaryInformation";
/// Name of the DocumentSummaryInformation stream
pub const DOCUMENT_SUMMARY_INFORMATION_STREAM: &str = "\u{5}DocumentSummaryInformation";
