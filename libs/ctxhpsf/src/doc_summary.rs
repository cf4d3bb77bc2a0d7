//! The `\u{5}DocumentSummaryInformation` property set
use crate::classid::ClassId;
use crate::codepage::CP_UNICODE;
use crate::custom::CustomProperties;
use crate::error::HpsfError;
use crate::macros::*;
use crate::property_ids::*;
use crate::property_set::PropertySet;
use crate::section::Section;
use crate::variant::{vt, Variant, Vector};
use serde::Serialize;

/// Named access to the DocumentSummaryInformation properties
///
/// The first section holds the well-known properties, the optional second one the
/// user defined properties (see [`CustomProperties`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DocumentSummaryInformation {
    ps: PropertySet,
}

impl Default for DocumentSummaryInformation {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSummaryInformation {
    /// Creates an empty DocumentSummaryInformation
    pub fn new() -> Self {
        Self {
            ps: PropertySet::with_sections(vec![Section::new(ClassId::DOC_SUMMARY_INFORMATION)]),
        }
    }

    /// Parses a DocumentSummaryInformation stream
    pub fn parse(data: &[u8]) -> Result<Self, HpsfError> {
        Self::try_from(PropertySet::parse(data)?)
    }

    pub(crate) fn from_property_set(ps: PropertySet) -> Self {
        Self { ps }
    }

    /// The underlying property set
    pub fn property_set(&self) -> &PropertySet {
        &self.ps
    }

    /// The underlying property set, mutably
    pub fn property_set_mut(&mut self) -> &mut PropertySet {
        &mut self.ps
    }

    /// Unwraps the underlying property set
    pub fn into_inner(self) -> PropertySet {
        self.ps
    }

    /// Checks whether the last value read by an accessor was missing
    pub fn was_null(&self) -> bool {
        self.ps.was_null()
    }

    fn section_mut(&mut self) -> &mut Section {
        self.ps
            .first_section_or_insert(ClassId::DOC_SUMMARY_INFORMATION)
    }

    string_accessors! {
        /// Category
        category, set_category, remove_category => PIDDSI_CATEGORY;
        /// Presentation format (e.g. "On-screen Show (4:3)")
        presentation_format, set_presentation_format, remove_presentation_format => PIDDSI_PRESFORMAT;
        /// Manager
        manager, set_manager, remove_manager => PIDDSI_MANAGER;
        /// Company
        company, set_company, remove_company => PIDDSI_COMPANY;
        /// Content type
        content_type, set_content_type, remove_content_type => PIDDSI_CONTENTTYPE;
        /// Content status
        content_status, set_content_status, remove_content_status => PIDDSI_CONTENTSTATUS;
        /// Language
        language, set_language, remove_language => PIDDSI_LANGUAGE;
        /// Document version
        document_version, set_document_version, remove_document_version => PIDDSI_DOCVERSION;
    }

    int_accessors! {
        /// Estimated size in bytes
        byte_count, set_byte_count, remove_byte_count => PIDDSI_BYTECOUNT;
        /// Line count
        line_count, set_line_count, remove_line_count => PIDDSI_LINECOUNT;
        /// Paragraph count
        par_count, set_par_count, remove_par_count => PIDDSI_PARCOUNT;
        /// Slide count
        slide_count, set_slide_count, remove_slide_count => PIDDSI_SLIDECOUNT;
        /// Slides with notes
        note_count, set_note_count, remove_note_count => PIDDSI_NOTECOUNT;
        /// Hidden slides
        hidden_count, set_hidden_count, remove_hidden_count => PIDDSI_HIDDENCOUNT;
        /// Multimedia clips
        mmclip_count, set_mmclip_count, remove_mmclip_count => PIDDSI_MMCLIPCOUNT;
        /// Character count including whitespace
        char_count_with_spaces, set_char_count_with_spaces, remove_char_count_with_spaces => PIDDSI_CCHWITHSPACES;
    }

    bool_accessors! {
        /// Thumbnail scaling (true) or cropping (false)
        scale, set_scale, remove_scale => PIDDSI_SCALE;
        /// Linked values changed outside of the application
        links_dirty, set_links_dirty, remove_links_dirty => PIDDSI_LINKSDIRTY;
        /// Shared document
        shared_document, set_shared_document, remove_shared_document => PIDDSI_SHAREDDOC;
        /// Hyperlinks changed outside of the application
        hyperlinks_changed, set_hyperlinks_changed, remove_hyperlinks_changed => PIDDSI_HYPERLINKSCHANGED;
    }

    /// Version of the application that wrote the document, as (major, minor)
    pub fn application_version(&self) -> Option<(u16, u16)> {
        let value = self.ps.property(PIDDSI_VERSION).and_then(|p| p.value.as_i64());
        self.ps.set_was_null(value.is_none());
        let v = value? as u32;
        Some(((v >> 16) as u16, v as u16))
    }

    /// Sets the application version
    pub fn set_application_version(&mut self, major: u16, minor: u16) {
        let v = (u32::from(major) << 16) | u32::from(minor);
        self.section_mut().set_value(PIDDSI_VERSION, v as i32);
    }

    /// Removes the application version
    pub fn remove_application_version(&mut self) {
        self.section_mut().remove_property(PIDDSI_VERSION);
    }

    /// The VBA project digital signature
    pub fn vba_digital_signature(&self) -> Option<&[u8]> {
        let value = self.ps.property(PIDDSI_DIGSIG).and_then(|p| match &p.value {
            Variant::Blob(b) => Some(b.as_slice()),
            _ => None,
        });
        self.ps.set_was_null(value.is_none());
        value
    }

    /// Sets the VBA project digital signature
    pub fn set_vba_digital_signature(&mut self, signature: Vec<u8>) {
        self.section_mut()
            .set_value(PIDDSI_DIGSIG, Variant::Blob(signature));
    }

    /// Removes the VBA project digital signature
    pub fn remove_vba_digital_signature(&mut self) {
        self.section_mut().remove_property(PIDDSI_DIGSIG);
    }

    /// Document parts grouped by heading
    ///
    /// Combines the heading pairs (heading, number of parts) with the list of parts.
    /// Returns `None` if either is missing or if they disagree.
    pub fn headings_parts(&self) -> Option<Vec<(String, Vec<String>)>> {
        let section = self.ps.first_section()?;
        let headings: Vec<(String, usize)> = match section.value(PIDDSI_HEADINGPAIR)? {
            Variant::Vector(v) => v
                .items
                .chunks_exact(2)
                .filter_map(|pair| {
                    let heading = pair[0].as_str()?;
                    let count = usize::try_from(pair[1].as_i64()?).ok()?;
                    Some((heading.to_string(), count))
                })
                .collect(),
            _ => return None,
        };
        let mut parts: Vec<String> = match section.value(PIDDSI_DOCPARTS)? {
            Variant::Vector(v) => v
                .items
                .iter()
                .filter_map(|s| s.as_str().map(String::from))
                .collect(),
            _ => return None,
        };
        let total = headings
            .iter()
            .try_fold(0usize, |acc, (_, n)| acc.checked_add(*n))?;
        if total != parts.len() {
            return None;
        }
        let mut ret = Vec::with_capacity(headings.len());
        for (heading, n) in headings {
            let tail = parts.split_off(n);
            ret.push((heading, parts));
            parts = tail;
        }
        Some(ret)
    }

    /// Sets the heading pairs and the document parts
    pub fn set_headings_parts(&mut self, headings_parts: &[(String, Vec<String>)]) {
        let mut pairs = Vec::with_capacity(headings_parts.len() * 2);
        let mut parts = Vec::new();
        for (heading, items) in headings_parts {
            pairs.push(Variant::LPStr(heading.clone()));
            pairs.push(Variant::I4(i32::try_from(items.len()).unwrap_or(i32::MAX)));
            parts.extend(items.iter().cloned().map(Variant::LPStr));
        }
        let section = self.section_mut();
        section.set_value(
            PIDDSI_HEADINGPAIR,
            Variant::Vector(Vector::new(vt::VARIANT, pairs)),
        );
        section.set_value(
            PIDDSI_DOCPARTS,
            Variant::Vector(Vector::new(vt::LPSTR, parts)),
        );
    }

    /// Removes the heading pairs and the document parts
    pub fn remove_headings_parts(&mut self) {
        let section = self.section_mut();
        section.remove_property(PIDDSI_HEADINGPAIR);
        section.remove_property(PIDDSI_DOCPARTS);
    }

    fn custom_section_index(&self) -> Option<usize> {
        self.ps
            .sections()
            .iter()
            .position(|s| s.format_id() == Some(ClassId::USER_DEFINED_PROPERTIES))
    }

    /// The user defined properties
    pub fn custom_properties(&self) -> Option<CustomProperties<&Section>> {
        let index = self.custom_section_index()?;
        self.ps.sections().get(index).map(CustomProperties::new)
    }

    /// The user defined properties, mutably
    ///
    /// The user defined section is created (with a Unicode codepage) if needed.
    pub fn custom_properties_mut(&mut self) -> CustomProperties<&mut Section> {
        let index = match self.custom_section_index() {
            Some(index) => index,
            None => {
                // The user defined section comes second
                self.ps
                    .first_section_or_insert(ClassId::DOC_SUMMARY_INFORMATION);
                let mut section = Section::new(ClassId::USER_DEFINED_PROPERTIES);
                section.set_codepage(CP_UNICODE);
                self.ps.add_section(section);
                self.ps.section_count() - 1
            }
        };
        CustomProperties::new(&mut self.ps.sections_mut()[index])
    }

    /// Removes the user defined section
    pub fn remove_custom_properties(&mut self) -> Option<Section> {
        let index = self.custom_section_index()?;
        self.ps.remove_section(index)
    }
}

impl TryFrom<PropertySet> for DocumentSummaryInformation {
    type Error = HpsfError;

    fn try_from(ps: PropertySet) -> Result<Self, Self::Error> {
        if ps.is_document_summary_information() {
            Ok(Self { ps })
        } else {
            Err(HpsfError::WrongPropertySetKind("DocumentSummaryInformation"))
        }
    }
}
