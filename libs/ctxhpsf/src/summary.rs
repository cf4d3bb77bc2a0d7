//! The `\u{5}SummaryInformation` property set
use crate::classid::ClassId;
use crate::error::HpsfError;
use crate::macros::*;
use crate::property_ids::*;
use crate::property_set::PropertySet;
use crate::section::Section;
use crate::thumbnail::Thumbnail;
use crate::variant::{ClipboardData, Filetime, Variant};
use serde::Serialize;

/// A dump tool entry: field name and accessor
pub type Field<T> = (&'static str, fn(&T) -> Option<String>);

/// Named access to the SummaryInformation properties
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SummaryInformation {
    ps: PropertySet,
}

impl Default for SummaryInformation {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryInformation {
    /// Creates an empty SummaryInformation
    pub fn new() -> Self {
        Self {
            ps: PropertySet::with_sections(vec![Section::new(ClassId::SUMMARY_INFORMATION)]),
        }
    }

    /// Parses a SummaryInformation stream
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
        self.ps.first_section_or_insert(ClassId::SUMMARY_INFORMATION)
    }

    string_accessors! {
        /// Document title
        title, set_title, remove_title => PIDSI_TITLE;
        /// Document subject
        subject, set_subject, remove_subject => PIDSI_SUBJECT;
        /// Document author
        author, set_author, remove_author => PIDSI_AUTHOR;
        /// Document keywords
        keywords, set_keywords, remove_keywords => PIDSI_KEYWORDS;
        /// Document comments
        comments, set_comments, remove_comments => PIDSI_COMMENTS;
        /// Template the document was created from
        template, set_template, remove_template => PIDSI_TEMPLATE;
        /// Last author
        last_author, set_last_author, remove_last_author => PIDSI_LASTAUTHOR;
        /// Revision number
        rev_number, set_rev_number, remove_rev_number => PIDSI_REVNUMBER;
        /// Application that created the document
        application_name, set_application_name, remove_application_name => PIDSI_APPNAME;
    }

    datetime_accessors! {
        /// Last printed time
        last_printed, set_last_printed, remove_last_printed => PIDSI_LASTPRINTED;
        /// Creation time
        create_date_time, set_create_date_time, remove_create_date_time => PIDSI_CREATE_DTM;
        /// Last save time
        last_save_date_time, set_last_save_date_time, remove_last_save_date_time => PIDSI_LASTSAVE_DTM;
    }

    int_accessors! {
        /// Page count
        page_count, set_page_count, remove_page_count => PIDSI_PAGECOUNT;
        /// Word count
        word_count, set_word_count, remove_word_count => PIDSI_WORDCOUNT;
        /// Character count
        char_count, set_char_count, remove_char_count => PIDSI_CHARCOUNT;
        /// Security flags (password protected, read-only recommended/enforced, locked)
        security, set_security, remove_security => PIDSI_SECURITY;
    }

    /// Total editing time in 100ns ticks
    ///
    /// Returns 0 if unset, see [`SummaryInformation::was_null`]. Tick counts beyond
    /// `i64::MAX` are clamped.
    pub fn edit_time(&self) -> i64 {
        let value = self
            .ps
            .property(PIDSI_EDITTIME)
            .and_then(|p| match &p.value {
                Variant::Filetime(ft) => Some(i64::try_from(ft.ticks()).unwrap_or(i64::MAX)),
                other => other.as_i64(),
            });
        self.ps.set_was_null(value.is_none());
        value.unwrap_or(0)
    }

    /// Sets the total editing time in 100ns ticks
    ///
    /// Negative spans are stored as 0.
    pub fn set_edit_time(&mut self, ticks: i64) {
        let ticks = u64::try_from(ticks).unwrap_or(0);
        self.section_mut()
            .set_value(PIDSI_EDITTIME, Filetime::new(ticks));
    }

    /// Removes the total editing time
    pub fn remove_edit_time(&mut self) {
        self.section_mut().remove_property(PIDSI_EDITTIME);
    }

    /// Document thumbnail
    pub fn thumbnail(&self) -> Option<Thumbnail<'_>> {
        let value = self.ps.property(PIDSI_THUMBNAIL).and_then(|p| match &p.value {
            Variant::CF(cf) => Some(Thumbnail::new(cf)),
            _ => None,
        });
        self.ps.set_was_null(value.is_none());
        value
    }

    /// Sets the document thumbnail
    pub fn set_thumbnail(&mut self, thumbnail: ClipboardData) {
        self.section_mut()
            .set_value(PIDSI_THUMBNAIL, Variant::CF(thumbnail));
    }

    /// Removes the document thumbnail
    pub fn remove_thumbnail(&mut self) {
        self.section_mut().remove_property(PIDSI_THUMBNAIL);
    }

    /// Every field, by name
    pub const FIELDS: &'static [Field<Self>] = &[
        ("title", |si| si.title().map(String::from)),
        ("subject", |si| si.subject().map(String::from)),
        ("author", |si| si.author().map(String::from)),
        ("keywords", |si| si.keywords().map(String::from)),
        ("comments", |si| si.comments().map(String::from)),
        ("template", |si| si.template().map(String::from)),
        ("last_author", |si| si.last_author().map(String::from)),
        ("rev_number", |si| si.rev_number().map(String::from)),
        ("edit_time", |si| {
            let ticks = si.edit_time();
            (!si.was_null()).then(|| ticks.to_string())
        }),
        ("last_printed", |si| si.last_printed().map(|t| t.to_string())),
        ("create_date_time", |si| {
            si.create_date_time().map(|t| t.to_string())
        }),
        ("last_save_date_time", |si| {
            si.last_save_date_time().map(|t| t.to_string())
        }),
        ("page_count", |si| {
            let v = si.page_count();
            (!si.was_null()).then(|| v.to_string())
        }),
        ("word_count", |si| {
            let v = si.word_count();
            (!si.was_null()).then(|| v.to_string())
        }),
        ("char_count", |si| {
            let v = si.char_count();
            (!si.was_null()).then(|| v.to_string())
        }),
        ("thumbnail", |si| {
            si.thumbnail().map(|t| {
                format!(
                    "clipboard format tag {}, {} bytes",
                    t.clipboard_format_tag(),
                    t.data().len()
                )
            })
        }),
        ("application_name", |si| {
            si.application_name().map(String::from)
        }),
        ("security", |si| {
            let v = si.security();
            (!si.was_null()).then(|| v.to_string())
        }),
    ];
}

impl TryFrom<PropertySet> for SummaryInformation {
    type Error = HpsfError;

    fn try_from(ps: PropertySet) -> Result<Self, Self::Error> {
        if ps.is_summary_information() {
            Ok(Self { ps })
        } else {
            Err(HpsfError::WrongPropertySetKind("SummaryInformation"))
        }
    }
}
