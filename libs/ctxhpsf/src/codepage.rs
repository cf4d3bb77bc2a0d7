//! Codepage aware text conversion
//!
//! Property set strings are stored in the codepage announced by the section's
//! CodePage property. UTF-16 codepages are handled here directly, everything else
//! goes through [`encoding_rs`].
use crate::error::HpsfError;
use encoding_rs::Encoding;

/// A Windows codepage identifier
///
/// The CodePage property is stored as a `VT_I2`, values above `0x7fff` (e.g. 65001)
/// are read back as negative numbers and reinterpreted as unsigned.
pub type CodePage = u16;

/// UTF-16 little endian (CP_WINUNICODE)
pub const CP_UNICODE: CodePage = 1200;
/// UTF-16 big endian
pub const CP_UNICODE_BE: CodePage = 1201;
/// UTF-8
pub const CP_UTF8: CodePage = 65001;
/// Western European (Windows)
pub const CP_WINDOWS_1252: CodePage = 1252;
/// The codepage assumed when a section carries no CodePage property
pub const DEFAULT_CODEPAGE: CodePage = CP_WINDOWS_1252;
/// CodePage property value standing for the default codepage
pub const CODEPAGE_UNSET: i16 = -1;

/// Maps a codepage to its `encoding_rs` counterpart
///
/// UTF-16 codepages have no mapping since `encoding_rs` cannot encode into them.
fn encoding_for(codepage: CodePage) -> Option<&'static Encoding> {
    Some(match codepage {
        874 => encoding_rs::WINDOWS_874,
        932 => encoding_rs::SHIFT_JIS,
        936 => encoding_rs::GBK,
        949 => encoding_rs::EUC_KR,
        950 => encoding_rs::BIG5,
        866 => encoding_rs::IBM866,
        1250 => encoding_rs::WINDOWS_1250,
        1251 => encoding_rs::WINDOWS_1251,
        1252 => encoding_rs::WINDOWS_1252,
        1253 => encoding_rs::WINDOWS_1253,
        1254 => encoding_rs::WINDOWS_1254,
        1255 => encoding_rs::WINDOWS_1255,
        1256 => encoding_rs::WINDOWS_1256,
        1257 => encoding_rs::WINDOWS_1257,
        1258 => encoding_rs::WINDOWS_1258,
        10000 => encoding_rs::MACINTOSH,
        20866 => encoding_rs::KOI8_R,
        21866 => encoding_rs::KOI8_U,
        20932 => encoding_rs::EUC_JP,
        28591 => encoding_rs::WINDOWS_1252,
        28592 => encoding_rs::ISO_8859_2,
        28593 => encoding_rs::ISO_8859_3,
        28594 => encoding_rs::ISO_8859_4,
        28595 => encoding_rs::ISO_8859_5,
        28596 => encoding_rs::ISO_8859_6,
        28597 => encoding_rs::ISO_8859_7,
        28598 => encoding_rs::ISO_8859_8,
        28603 => encoding_rs::ISO_8859_13,
        28605 => encoding_rs::ISO_8859_15,
        50220 => encoding_rs::ISO_2022_JP,
        54936 => encoding_rs::GB18030,
        65001 => encoding_rs::UTF_8,
        _ => return None,
    })
}

/// Indicates whether the codepage uses two bytes per code unit
pub fn is_unicode(codepage: CodePage) -> bool {
    codepage == CP_UNICODE || codepage == CP_UNICODE_BE
}

/// Indicates whether strings in this codepage can be read and written
pub fn is_supported(codepage: CodePage) -> bool {
    is_unicode(codepage) || encoding_for(codepage).is_some()
}

/// Size in bytes of the string terminator in this codepage
pub fn nul_len(codepage: CodePage) -> usize {
    if is_unicode(codepage) { 2 } else { 1 }
}

/// Decodes `data` (with no terminator) into a `String`
///
/// Malformed sequences are replaced with U+FFFD, unknown codepages are an error.
pub fn decode_str(data: &[u8], codepage: CodePage) -> Result<String, HpsfError> {
    match codepage {
        CP_UNICODE => Ok(decode_utf16(data, u16::from_le_bytes)),
        CP_UNICODE_BE => Ok(decode_utf16(data, u16::from_be_bytes)),
        cp => {
            let encoding =
                encoding_for(cp).ok_or(HpsfError::UnsupportedEncodingForCodepage(cp))?;
            let (text, _had_errors) = encoding.decode_without_bom_handling(data);
            Ok(text.into_owned())
        }
    }
}

fn decode_utf16(data: &[u8], f: fn([u8; 2]) -> u16) -> String {
    let units = data.chunks_exact(2).map(|c| f([c[0], c[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Encodes `text` into `codepage` (with no terminator)
///
/// Fails with [`HpsfError::Unencodable`] if any character has no representation
pub fn encode_str(text: &str, codepage: CodePage) -> Result<Vec<u8>, HpsfError> {
    match codepage {
        CP_UNICODE => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
        CP_UNICODE_BE => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        cp => {
            let encoding =
                encoding_for(cp).ok_or(HpsfError::UnsupportedEncodingForCodepage(cp))?;
            let (data, _, had_errors) = encoding.encode(text);
            if had_errors {
                return Err(HpsfError::Unencodable(cp));
            }
            Ok(data.into_owned())
        }
    }
}

/// Indicates whether `text` survives a trip through `codepage`
pub fn can_encode(text: &str, codepage: CodePage) -> bool {
    encode_str(text, codepage).is_ok()
}
