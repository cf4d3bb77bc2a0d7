//! Well-known property identifiers
//!
//! The identifiers of the SummaryInformation (`PIDSI_*`) and the DocumentSummaryInformation
//! (`PIDDSI_*`) property sets, plus the ones reserved in every section.

/// The Dictionary property (no type tag)
pub const PID_DICTIONARY: u32 = 0x00000000;
/// The CodePage property (`VT_I2`)
pub const PID_CODEPAGE: u32 = 0x00000001;
/// The first identifier available to normal properties
pub const PID_FIRST_USABLE: u32 = 0x00000002;
/// The Locale property (`VT_UI4`)
pub const PID_LOCALE: u32 = 0x80000000;
/// The Behavior property (`VT_UI4`)
pub const PID_BEHAVIOR: u32 = 0x80000003;

/// Document title
pub const PIDSI_TITLE: u32 = 0x02;
/// Document subject
pub const PIDSI_SUBJECT: u32 = 0x03;
/// Document author
pub const PIDSI_AUTHOR: u32 = 0x04;
/// Document keywords
pub const PIDSI_KEYWORDS: u32 = 0x05;
/// Document comments
pub const PIDSI_COMMENTS: u32 = 0x06;
/// Template the document is based on
pub const PIDSI_TEMPLATE: u32 = 0x07;
/// Last author
pub const PIDSI_LASTAUTHOR: u32 = 0x08;
/// Revision number
pub const PIDSI_REVNUMBER: u32 = 0x09;
/// Total editing time (`VT_FILETIME` holding a span)
pub const PIDSI_EDITTIME: u32 = 0x0A;
/// Last printed
pub const PIDSI_LASTPRINTED: u32 = 0x0B;
/// Creation time
pub const PIDSI_CREATE_DTM: u32 = 0x0C;
/// Last saved
pub const PIDSI_LASTSAVE_DTM: u32 = 0x0D;
/// Page count
pub const PIDSI_PAGECOUNT: u32 = 0x0E;
/// Word count
pub const PIDSI_WORDCOUNT: u32 = 0x0F;
/// Character count
pub const PIDSI_CHARCOUNT: u32 = 0x10;
/// Thumbnail (`VT_CF`)
pub const PIDSI_THUMBNAIL: u32 = 0x11;
/// Application name
pub const PIDSI_APPNAME: u32 = 0x12;
/// Security flags
pub const PIDSI_SECURITY: u32 = 0x13;

/// Category
pub const PIDDSI_CATEGORY: u32 = 0x02;
/// Presentation format
pub const PIDDSI_PRESFORMAT: u32 = 0x03;
/// Byte count
pub const PIDDSI_BYTECOUNT: u32 = 0x04;
/// Line count
pub const PIDDSI_LINECOUNT: u32 = 0x05;
/// Paragraph count
pub const PIDDSI_PARCOUNT: u32 = 0x06;
/// Slide count
pub const PIDDSI_SLIDECOUNT: u32 = 0x07;
/// Note count
pub const PIDDSI_NOTECOUNT: u32 = 0x08;
/// Hidden slide count
pub const PIDDSI_HIDDENCOUNT: u32 = 0x09;
/// Multimedia clip count
pub const PIDDSI_MMCLIPCOUNT: u32 = 0x0A;
/// Scale
pub const PIDDSI_SCALE: u32 = 0x0B;
/// Heading pairs (`VT_VECTOR | VT_VARIANT`)
pub const PIDDSI_HEADINGPAIR: u32 = 0x0C;
/// Document parts (`VT_VECTOR | VT_LPSTR`)
pub const PIDDSI_DOCPARTS: u32 = 0x0D;
/// Manager
pub const PIDDSI_MANAGER: u32 = 0x0E;
/// Company
pub const PIDDSI_COMPANY: u32 = 0x0F;
/// Links dirty
pub const PIDDSI_LINKSDIRTY: u32 = 0x10;
/// Character count including whitespace
pub const PIDDSI_CCHWITHSPACES: u32 = 0x11;
/// Shared document
pub const PIDDSI_SHAREDDOC: u32 = 0x13;
/// Link base
pub const PIDDSI_LINKBASE: u32 = 0x14;
/// Hyperlinks
pub const PIDDSI_HLINKS: u32 = 0x15;
/// Hyperlinks changed
pub const PIDDSI_HYPERLINKSCHANGED: u32 = 0x16;
/// Application version
pub const PIDDSI_VERSION: u32 = 0x17;
/// VBA digital signature
pub const PIDDSI_DIGSIG: u32 = 0x18;
/// Content type
pub const PIDDSI_CONTENTTYPE: u32 = 0x1A;
/// Content status
pub const PIDDSI_CONTENTSTATUS: u32 = 0x1B;
/// Language
pub const PIDDSI_LANGUAGE: u32 = 0x1C;
/// Document version
pub const PIDDSI_DOCVERSION: u32 = 0x1D;

/// Names of the identifiers valid in any section
pub fn reserved_name(id: u32) -> Option<&'static str> {
    Some(match id {
        PID_DICTIONARY => "PID_DICTIONARY",
        PID_CODEPAGE => "PID_CODEPAGE",
        PID_LOCALE => "PID_LOCALE",
        PID_BEHAVIOR => "PID_BEHAVIOR",
        _ => return None,
    })
}

/// Names of the SummaryInformation identifiers
pub fn summary_name(id: u32) -> Option<&'static str> {
    Some(match id {
        PIDSI_TITLE => "PID_TITLE",
        PIDSI_SUBJECT => "PID_SUBJECT",
        PIDSI_AUTHOR => "PID_AUTHOR",
        PIDSI_KEYWORDS => "PID_KEYWORDS",
        PIDSI_COMMENTS => "PID_COMMENTS",
        PIDSI_TEMPLATE => "PID_TEMPLATE",
        PIDSI_LASTAUTHOR => "PID_LASTAUTHOR",
        PIDSI_REVNUMBER => "PID_REVNUMBER",
        PIDSI_EDITTIME => "PID_EDITTIME",
        PIDSI_LASTPRINTED => "PID_LASTPRINTED",
        PIDSI_CREATE_DTM => "PID_CREATE_DTM",
        PIDSI_LASTSAVE_DTM => "PID_LASTSAVE_DTM",
        PIDSI_PAGECOUNT => "PID_PAGECOUNT",
        PIDSI_WORDCOUNT => "PID_WORDCOUNT",
        PIDSI_CHARCOUNT => "PID_CHARCOUNT",
        PIDSI_THUMBNAIL => "PID_THUMBNAIL",
        PIDSI_APPNAME => "PID_APPNAME",
        PIDSI_SECURITY => "PID_SECURITY",
        _ => return reserved_name(id),
    })
}

/// Names of the DocumentSummaryInformation identifiers
pub fn doc_summary_name(id: u32) -> Option<&'static str> {
    Some(match id {
        PIDDSI_CATEGORY => "PID_CATEGORY",
        PIDDSI_PRESFORMAT => "PID_PRESFORMAT",
        PIDDSI_BYTECOUNT => "PID_BYTECOUNT",
        PIDDSI_LINECOUNT => "PID_LINECOUNT",
        PIDDSI_PARCOUNT => "PID_PARCOUNT",
        PIDDSI_SLIDECOUNT => "PID_SLIDECOUNT",
        PIDDSI_NOTECOUNT => "PID_NOTECOUNT",
        PIDDSI_HIDDENCOUNT => "PID_HIDDENCOUNT",
        PIDDSI_MMCLIPCOUNT => "PID_MMCLIPCOUNT",
        PIDDSI_SCALE => "PID_SCALE",
        PIDDSI_HEADINGPAIR => "PID_HEADINGPAIR",
        PIDDSI_DOCPARTS => "PID_DOCPARTS",
        PIDDSI_MANAGER => "PID_MANAGER",
        PIDDSI_COMPANY => "PID_COMPANY",
        PIDDSI_LINKSDIRTY => "PID_LINKSDIRTY",
        PIDDSI_CCHWITHSPACES => "PID_CCHWITHSPACES",
        PIDDSI_SHAREDDOC => "PID_SHAREDDOC",
        PIDDSI_LINKBASE => "PID_LINKBASE",
        PIDDSI_HLINKS => "PID_HLINKS",
        PIDDSI_HYPERLINKSCHANGED => "PID_HYPERLINKSCHANGED",
        PIDDSI_VERSION => "PID_VERSION",
        PIDDSI_DIGSIG => "PID_DIGSIG",
        PIDDSI_CONTENTTYPE => "PID_CONTENTTYPE",
        PIDDSI_CONTENTSTATUS => "PID_CONTENTSTATUS",
        PIDDSI_LANGUAGE => "PID_LANGUAGE",
        PIDDSI_DOCVERSION => "PID_DOCVERSION",
        _ => return reserved_name(id),
    })
}
