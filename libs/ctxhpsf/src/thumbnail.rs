//! Document thumbnails (the `VT_CF` value of `PIDSI_THUMBNAIL`)
use crate::variant::ClipboardData;

/// Windows clipboard format: `data` starts with a `CF_*` value
pub const CFTAG_WINDOWS: i32 = -1;
/// Macintosh clipboard format
pub const CFTAG_MACINTOSH: i32 = -2;
/// Format identifier: `data` starts with a FMTID
pub const CFTAG_FMTID: i32 = -3;
/// No data
pub const CFTAG_NODATA: i32 = 0;

/// Bitmap
pub const CF_BITMAP: i32 = 2;
/// Windows metafile with a `METAFILEPICT` header
pub const CF_METAFILEPICT: i32 = 3;
/// Device independent bitmap
pub const CF_DIB: i32 = 8;
/// Enhanced metafile
pub const CF_ENHMETAFILE: i32 = 14;

// CF_* value (4) + METAFILEPICT (mm, xExt, yExt, hMF: 2 bytes each)
const WMF_OFFSET: usize = 12;

/// A borrowed view over a thumbnail
#[derive(Debug, Clone, Copy)]
pub struct Thumbnail<'a> {
    clipboard: &'a ClipboardData,
}

impl<'a> Thumbnail<'a> {
    /// Creates a view over clipboard data
    pub fn new(clipboard: &'a ClipboardData) -> Self {
        Self { clipboard }
    }

    /// The clipboard format tag (one of the `CFTAG_*` values or the length of a format name)
    pub fn clipboard_format_tag(&self) -> i32 {
        self.clipboard.format
    }

    /// The Windows clipboard format (`CF_*`), only defined for [`CFTAG_WINDOWS`]
    pub fn clipboard_format(&self) -> Option<i32> {
        if self.clipboard.format != CFTAG_WINDOWS {
            return None;
        }
        let format = self.clipboard.data.get(..4)?;
        Some(i32::from_le_bytes([format[0], format[1], format[2], format[3]]))
    }

    /// The raw thumbnail data
    pub fn data(&self) -> &'a [u8] {
        &self.clipboard.data
    }

    /// The Windows metafile, if the thumbnail holds one
    pub fn as_wmf(&self) -> Option<&'a [u8]> {
        if self.clipboard_format()? != CF_METAFILEPICT {
            return None;
        }
        self.clipboard.data.get(WMF_OFFSET..)
    }
}
