//! # Property Set Streams
//!
//! [`PropertySet`] reads and writes *Simple Property Set Streams* as described in
//! [\[MS-OLEPS\]](https://docs.microsoft.com/en-us/openspecs/windows_protocols/ms-oleps/bf7aeae8-c47a-4939-9f45-700158dac3bc).
//!
//! A stream is made of a fixed header followed by one or two [`Section`]s:
//! ```text
//! byteOrder:u16 format:u16 osVersion:u32 classID:16 sectionCount:u32
//! {formatID:16 offset:u32} * sectionCount
//! sections...
//! ```
//!
//! # Examples
//! ```no_run
//! use ctxhpsf::{PropertySet, HpsfError};
//!
//! fn print_properties(data: &[u8]) -> Result<(), HpsfError> {
//!     if !PropertySet::is_property_set_stream(data) {
//!         return Ok(());
//!     }
//!     let ps = PropertySet::parse(data)?;
//!     for section in ps.sections() {
//!         for p in section.properties() {
//!             println!("{:?}: {}", section.pid_name(p.id), p.value);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#[cfg(test)]
mod test;

use crate::classid::ClassId;
use crate::config::{CodecOptions, Policy};
use crate::doc_summary::DocumentSummaryInformation;
use crate::error::HpsfError;
use crate::property::Property;
use crate::section::Section;
use crate::summary::SummaryInformation;
use ctxutils::io::*;
use serde::Serialize;
use std::cell::Cell;
use std::io::{Cursor, Write};
use time::OffsetDateTime;
use tracing::{debug, trace, warn};

/// The only byte order mark allowed
pub const BYTE_ORDER_ASSERTION: u16 = 0xFFFE;
/// Format version 0
pub const FORMAT_ASSERTION: u16 = 0x0000;
/// Format version 1 (allows long names and more types)
pub const FORMAT_VERSION_1: u16 = 0x0001;
/// The OS version written by default: Win32, version 10.4
pub const DEFAULT_OS_VERSION: u32 = 0x0002_0A04;

const HEADER_LEN: usize = 28;
const SECTION_ENTRY_LEN: usize = 20;
/// A property set stream holds one or two sections
const SECTION_COUNT_RANGE: std::ops::RangeInclusive<usize> = 1..=2;

/// A property set
///
/// Two property sets are equal if their header fields match and their sections are
/// pairwise equal.
#[derive(Debug, Clone, Serialize)]
pub struct PropertySet {
    byte_order: u16,
    format: u16,
    os_version: u32,
    class_id: ClassId,
    sections: Vec<Section>,
    #[serde(skip)]
    anomalies: Vec<String>,
    #[serde(skip)]
    was_null: Cell<bool>,
}

impl Default for PropertySet {
    fn default() -> Self {
        Self::new()
    }
}

fn check_header(data: &[u8]) -> Result<(), String> {
    if data.len() < HEADER_LEN + SECTION_ENTRY_LEN {
        return Err(format!("stream too short ({} bytes)", data.len()));
    }
    let byte_order = u16::from_le_bytes([data[0], data[1]]);
    if byte_order != BYTE_ORDER_ASSERTION {
        return Err(format!("invalid byte order ({byte_order:04x})"));
    }
    let format = u16::from_le_bytes([data[2], data[3]]);
    if ![FORMAT_ASSERTION, FORMAT_VERSION_1].contains(&format) {
        return Err(format!("invalid format ({format:04x})"));
    }
    let section_count = u32::from_le_bytes([data[24], data[25], data[26], data[27]]);
    if !usize::try_from(section_count).is_ok_and(|n| SECTION_COUNT_RANGE.contains(&n)) {
        return Err(format!("invalid number of sections ({section_count})"));
    }
    Ok(())
}

impl PropertySet {
    /// Creates a property set with a single, empty section
    ///
    /// The section has no format identifier: one must be set before writing.
    pub fn new() -> Self {
        Self::with_sections(vec![Section::default()])
    }

    /// Creates a property set holding the given sections
    pub fn with_sections(sections: Vec<Section>) -> Self {
        Self {
            byte_order: BYTE_ORDER_ASSERTION,
            format: FORMAT_ASSERTION,
            os_version: DEFAULT_OS_VERSION,
            class_id: ClassId::NULL,
            sections,
            anomalies: Vec::new(),
            was_null: Cell::new(false),
        }
    }

    /// Checks whether `data` starts like a property set stream
    ///
    /// Only the header is inspected; this never fails.
    pub fn is_property_set_stream(data: &[u8]) -> bool {
        check_header(data).is_ok()
    }

    /// Parses a property set stream with the default options
    pub fn parse(data: &[u8]) -> Result<Self, HpsfError> {
        Self::parse_with(data, &CodecOptions::default())
    }

    /// Parses a property set stream
    ///
    /// Data beyond [`CodecOptions::max_stream_size`] is ignored.
    pub fn parse_with(data: &[u8], options: &CodecOptions) -> Result<Self, HpsfError> {
        let max = usize::try_from(options.max_stream_size).unwrap_or(usize::MAX);
        let data = &data[..data.len().min(max)];
        check_header(data).map_err(HpsfError::NotAPropertySetStream)?;

        let mut reader = Cursor::new(data);
        let byte_order = rdu16le(&mut reader)?;
        let format = rdu16le(&mut reader)?;
        let os_version = rdu32le(&mut reader)?;
        let class_id = ClassId::read(data, 8)?;
        reader.set_position(24);
        let section_count = rdu32le(&mut reader)?;
        trace!(
            "Property set: format {format}, os version {os_version:08x}, {section_count} section(s)"
        );

        let mut anomalies = Vec::new();
        let mut sections = Vec::with_capacity(section_count as usize);
        for n in 0..section_count as usize {
            let entry = HEADER_LEN + n * SECTION_ENTRY_LEN;
            let format_id = ClassId::read(data, entry)?;
            reader.set_position((entry + ClassId::LENGTH) as u64);
            let offset = rdu32le(&mut reader)? as usize;
            match Section::parse(data, offset, format_id, options) {
                Ok(section) => sections.push(section),
                Err(e @ HpsfError::MalformedPropertyData(_))
                    if options.malformed_section == Policy::Tolerate =>
                {
                    let msg = format!("Section {n} ({format_id}) skipped: {e}");
                    if options.log_unsupported {
                        warn!("{msg}");
                    } else {
                        debug!("{msg}");
                    }
                    anomalies.push(msg);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Self {
            byte_order,
            format,
            os_version,
            class_id,
            sections,
            anomalies,
            was_null: Cell::new(false),
        })
    }

    /// Serializes the property set
    pub fn to_bytes(&self) -> Result<Vec<u8>, HpsfError> {
        if !SECTION_COUNT_RANGE.contains(&self.sections.len()) {
            return Err(HpsfError::UnsupportedWriteVariant(format!(
                "property set with {} section(s)",
                self.sections.len()
            )));
        }
        // Sections first: their sizes determine the offsets
        let bodies = self
            .sections
            .iter()
            .map(|s| s.to_bytes().map(|b| (s, b)))
            .collect::<Result<Vec<_>, _>>()?;
        let section_count = bodies.len() as u32;
        let mut offset = HEADER_LEN + SECTION_ENTRY_LEN * bodies.len();
        let total = offset + bodies.iter().map(|(_, b)| b.len()).sum::<usize>();

        let mut out = Vec::with_capacity(total);
        wru16le(&mut out, self.byte_order)?;
        wru16le(&mut out, self.format)?;
        wru32le(&mut out, self.os_version)?;
        out.extend_from_slice(self.class_id.as_bytes());
        wru32le(&mut out, section_count)?;
        for (section, body) in &bodies {
            let format_id = section.format_id().ok_or(HpsfError::MissingFormatId)?;
            out.extend_from_slice(format_id.as_bytes());
            wru32le(
                &mut out,
                u32::try_from(offset).map_err(|_| {
                    HpsfError::UnsupportedWriteVariant(format!("property set of {total} bytes"))
                })?,
            )?;
            offset += body.len();
        }
        for (_, body) in bodies {
            out.extend_from_slice(&body);
        }
        Ok(out)
    }

    /// Writes the property set, returns the number of bytes written
    ///
    /// The whole stream is serialized before anything is written, so nothing reaches
    /// `writer` on failure.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<usize, HpsfError> {
        let data = self.to_bytes()?;
        writer.write_all(&data)?;
        Ok(data.len())
    }

    /// The byte order mark
    pub fn byte_order(&self) -> u16 {
        self.byte_order
    }

    /// The format version
    pub fn format(&self) -> u16 {
        self.format
    }

    /// Sets the format version
    pub fn set_format(&mut self, format: u16) {
        self.format = format;
    }

    /// The OS version: the high word is the OS kind, the low word its version
    pub fn os_version(&self) -> u32 {
        self.os_version
    }

    /// Sets the OS version
    pub fn set_os_version(&mut self, os_version: u32) {
        self.os_version = os_version;
    }

    /// The associated CLSID
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    /// Sets the associated CLSID
    pub fn set_class_id(&mut self, class_id: ClassId) {
        self.class_id = class_id;
    }

    /// The sections
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The sections, mutably
    pub fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    /// The number of sections
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Appends a section
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Removes and returns the section at `index`
    pub fn remove_section(&mut self, index: usize) -> Option<Section> {
        (index < self.sections.len()).then(|| self.sections.remove(index))
    }

    /// Removes all the sections
    pub fn clear_sections(&mut self) {
        self.sections.clear();
    }

    /// The first section
    pub fn first_section(&self) -> Option<&Section> {
        self.sections.first()
    }

    /// The first section, mutably
    pub fn first_section_mut(&mut self) -> Option<&mut Section> {
        self.sections.first_mut()
    }

    /// The only section
    ///
    /// Fails if the property set does not have exactly one section.
    pub fn single_section(&self) -> Result<&Section, HpsfError> {
        match self.sections.as_slice() {
            [section] => Ok(section),
            _ => Err(HpsfError::WrongPropertySetKind("single section property set")),
        }
    }

    /// Checks whether this is a SummaryInformation property set
    pub fn is_summary_information(&self) -> bool {
        self.first_section()
            .and_then(|s| s.format_id())
            .is_some_and(|id| id == ClassId::SUMMARY_INFORMATION)
    }

    /// Checks whether this is a DocumentSummaryInformation property set
    pub fn is_document_summary_information(&self) -> bool {
        self.first_section()
            .and_then(|s| s.format_id())
            .is_some_and(|id| id == ClassId::DOC_SUMMARY_INFORMATION)
    }

    /// Returns a property of the first section
    pub fn property(&self, id: u32) -> Option<&Property> {
        self.first_section()?.property(id)
    }

    /// The value of an integer property of the first section
    ///
    /// Returns 0 if the property is missing or not an integer, see [`PropertySet::was_null`].
    pub fn int_value(&self, id: u32) -> i64 {
        let value = self.first_section().and_then(|s| s.int_value(id));
        self.was_null.set(value.is_none());
        value.unwrap_or(0)
    }

    /// The value of a boolean property of the first section
    ///
    /// Returns false if the property is missing or not a boolean, see [`PropertySet::was_null`].
    pub fn bool_value(&self, id: u32) -> bool {
        let value = self.first_section().and_then(|s| s.bool_value(id));
        self.was_null.set(value.is_none());
        value.unwrap_or(false)
    }

    /// The value of a string property of the first section, see [`PropertySet::was_null`]
    pub fn string_value(&self, id: u32) -> Option<&str> {
        let value = self.first_section().and_then(|s| s.string_value(id));
        self.was_null.set(value.is_none());
        value
    }

    /// The value of a `VT_FILETIME` property of the first section, see [`PropertySet::was_null`]
    pub fn datetime_value(&self, id: u32) -> Option<OffsetDateTime> {
        let value = self
            .first_section()
            .and_then(|s| s.value(id))
            .and_then(|v| v.as_filetime());
        self.was_null.set(value.is_none());
        value.and_then(|ft| ft.as_datetime())
    }

    /// Checks whether the last value read by an accessor was missing
    pub fn was_null(&self) -> bool {
        self.was_null.get()
    }

    pub(crate) fn set_was_null(&self, was_null: bool) {
        self.was_null.set(was_null);
    }

    /// The first section, created with `format_id` if there is none
    pub(crate) fn first_section_or_insert(&mut self, format_id: ClassId) -> &mut Section {
        if self.sections.is_empty() {
            self.sections.push(Section::new(format_id));
        }
        &mut self.sections[0]
    }

    /// All the problems tolerated while parsing, sections included
    pub fn anomalies(&self) -> Vec<&str> {
        self.anomalies
            .iter()
            .chain(self.sections.iter().flat_map(|s| s.anomalies()))
            .map(|s| s.as_str())
            .collect()
    }
}

impl PartialEq for PropertySet {
    fn eq(&self, other: &Self) -> bool {
        self.byte_order == other.byte_order
            && self.format == other.format
            && self.os_version == other.os_version
            && self.class_id == other.class_id
            && self.sections == other.sections
    }
}

/// A property set classified by its first section
#[derive(Debug, Clone)]
pub enum PropertySetKind {
    /// A SummaryInformation property set
    Summary(SummaryInformation),
    /// A DocumentSummaryInformation property set
    DocumentSummary(DocumentSummaryInformation),
    /// Any other property set
    Generic(PropertySet),
}

impl PropertySetKind {
    /// Parses and classifies a property set stream
    pub fn from_bytes(data: &[u8], options: &CodecOptions) -> Result<Self, HpsfError> {
        PropertySet::parse_with(data, options).map(Self::from)
    }

    /// A short name for the kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::Summary(_) => "SummaryInformation",
            Self::DocumentSummary(_) => "DocumentSummaryInformation",
            Self::Generic(_) => "PropertySet",
        }
    }

    /// The underlying property set
    pub fn property_set(&self) -> &PropertySet {
        match self {
            Self::Summary(si) => si.property_set(),
            Self::DocumentSummary(dsi) => dsi.property_set(),
            Self::Generic(ps) => ps,
        }
    }
}

impl From<PropertySet> for PropertySetKind {
    fn from(ps: PropertySet) -> Self {
        if ps.is_summary_information() {
            Self::Summary(SummaryInformation::from_property_set(ps))
        } else if ps.is_document_summary_information() {
            Self::DocumentSummary(DocumentSummaryInformation::from_property_set(ps))
        } else {
            Self::Generic(ps)
        }
    }
}
