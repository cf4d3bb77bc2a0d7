//! Typed property values and their binary representation
//!
//! On disk a property value is a *TypedPropertyValue*: a 16 bit type tag, 16 bits of
//! zero padding and a type specific payload, padded to a multiple of 4 bytes.
//! [`decode`] and [`encode`] convert between payloads and [`Variant`]s.
//!
//! # String padding
//!
//! Office and explorer.exe only pad a *CodepageString* when the codepage is
//! CP_WINUNICODE. Strings stored alone (`VT_BSTR`, `VT_LPSTR`) are padded to 4 bytes
//! as \[MS-OLEPS\] 2.5 requires, strings inside a vector are packed.
//!
//! Strings are read up to their first NUL character.


use crate::classid::ClassId;
use crate::codepage::{self, CodePage};
use crate::config::{CodecOptions, Policy};
use crate::error::HpsfError;
use ctxutils::{
    io::*,
    win32::{datetime_to_filetime, filetime_to_datetime},
};
use serde::{Serialize, Serializer};
use std::fmt::{self, Display};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, warn};

/// Variant type tags
#[allow(missing_docs)]
pub mod vt {
    pub const EMPTY: u16 = 0x0000;
    pub const NULL: u16 = 0x0001;
    pub const I2: u16 = 0x0002;
    pub const I4: u16 = 0x0003;
    pub const R4: u16 = 0x0004;
    pub const R8: u16 = 0x0005;
    pub const CY: u16 = 0x0006;
    pub const DATE: u16 = 0x0007;
    pub const BSTR: u16 = 0x0008;
    pub const ERROR: u16 = 0x000A;
    pub const BOOL: u16 = 0x000B;
    pub const VARIANT: u16 = 0x000C;
    pub const DECIMAL: u16 = 0x000E;
    pub const I1: u16 = 0x0010;
    pub const UI1: u16 = 0x0011;
    pub const UI2: u16 = 0x0012;
    pub const UI4: u16 = 0x0013;
    pub const I8: u16 = 0x0014;
    pub const UI8: u16 = 0x0015;
    pub const INT: u16 = 0x0016;
    pub const UINT: u16 = 0x0017;
    pub const LPSTR: u16 = 0x001E;
    pub const LPWSTR: u16 = 0x001F;
    pub const FILETIME: u16 = 0x0040;
    pub const BLOB: u16 = 0x0041;
    pub const STREAM: u16 = 0x0042;
    pub const STORAGE: u16 = 0x0043;
    pub const STREAMED_OBJECT: u16 = 0x0044;
    pub const STORED_OBJECT: u16 = 0x0045;
    pub const BLOB_OBJECT: u16 = 0x0046;
    pub const CF: u16 = 0x0047;
    pub const CLSID: u16 = 0x0048;
    pub const VERSIONED_STREAM: u16 = 0x0049;
    pub const VECTOR: u16 = 0x1000;
    pub const ARRAY: u16 = 0x2000;
    pub const TYPE_MASK: u16 = 0x0FFF;
}

/// Returns the symbolic name of a variant type tag (e.g. `VT_VECTOR|VT_LPSTR`)
pub fn vt_name(tag: u16) -> String {
    let base = match tag & vt::TYPE_MASK {
        vt::EMPTY => "VT_EMPTY",
        vt::NULL => "VT_NULL",
        vt::I2 => "VT_I2",
        vt::I4 => "VT_I4",
        vt::R4 => "VT_R4",
        vt::R8 => "VT_R8",
        vt::CY => "VT_CY",
        vt::DATE => "VT_DATE",
        vt::BSTR => "VT_BSTR",
        vt::ERROR => "VT_ERROR",
        vt::BOOL => "VT_BOOL",
        vt::VARIANT => "VT_VARIANT",
        vt::DECIMAL => "VT_DECIMAL",
        vt::I1 => "VT_I1",
        vt::UI1 => "VT_UI1",
        vt::UI2 => "VT_UI2",
        vt::UI4 => "VT_UI4",
        vt::I8 => "VT_I8",
        vt::UI8 => "VT_UI8",
        vt::INT => "VT_INT",
        vt::UINT => "VT_UINT",
        vt::LPSTR => "VT_LPSTR",
        vt::LPWSTR => "VT_LPWSTR",
        vt::FILETIME => "VT_FILETIME",
        vt::BLOB => "VT_BLOB",
        vt::STREAM => "VT_STREAM",
        vt::STORAGE => "VT_STORAGE",
        vt::STREAMED_OBJECT => "VT_STREAMED_OBJECT",
        vt::STORED_OBJECT => "VT_STORED_OBJECT",
        vt::BLOB_OBJECT => "VT_BLOB_OBJECT",
        vt::CF => "VT_CF",
        vt::CLSID => "VT_CLSID",
        vt::VERSIONED_STREAM => "VT_VERSIONED_STREAM",
        _ => return format!("0x{tag:04X}"),
    };
    match tag & !vt::TYPE_MASK {
        0 => base.to_string(),
        vt::VECTOR => format!("VT_VECTOR|{base}"),
        vt::ARRAY => format!("VT_ARRAY|{base}"),
        _ => format!("0x{tag:04X}"),
    }
}

#[inline]
fn into_usize<T: TryInto<usize>>(v: T) -> Result<usize, HpsfError> {
    TryInto::<usize>::try_into(v)
        .map_err(|_| HpsfError::malformed("Cannot convert value to usize"))
}

#[inline]
fn into_u32(v: usize, what: &str) -> Result<u32, HpsfError> {
    u32::try_from(v).map_err(|_| HpsfError::UnsupportedWriteVariant(format!("{what} is too large")))
}

fn remaining<R: Seek>(reader: &mut R) -> Result<u64, HpsfError> {
    let pos = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(pos))?;
    Ok(end.saturating_sub(pos))
}

/// Reads exactly `len` bytes, refusing lengths which exceed the available data
fn read_bytes<R: Read + Seek>(reader: &mut R, len: u64) -> Result<Vec<u8>, HpsfError> {
    let available = remaining(reader)?;
    if len > available {
        return Err(HpsfError::malformed(format!(
            "Declared length {len} exceeds the {available} bytes available"
        )));
    }
    let mut data = vec![0u8; into_usize(len)?];
    reader.read_exact(&mut data)?;
    Ok(data)
}

fn skip<R: Seek>(reader: &mut R, len: usize) -> Result<(), HpsfError> {
    if len > 0 {
        reader.seek(SeekFrom::Current(len as i64))?;
    }
    Ok(())
}

fn write_zeros<W: Write>(writer: &mut W, len: usize) -> Result<usize, HpsfError> {
    writer.write_all(&vec![0u8; len])?;
    Ok(len)
}

/// Reads the type tag and the padding word of a TypedPropertyValue
pub(crate) fn read_type_tag<R: Read>(reader: &mut R) -> Result<u16, HpsfError> {
    let value_type = rdu16le(reader)?;
    let padding = rdu16le(reader)?;
    if padding != 0 {
        return Err(HpsfError::malformed(format!(
            "Invalid padding {padding:x} found in property with type 0x{value_type:x}"
        )));
    }
    Ok(value_type)
}

/// A currency number stored as an 8-byte, scaled by 10,000 to give a fixed-point number
/// with 15 digits to the left of the decimal point and 4 digits to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    /// The scaled value
    pub value: i64,
}

impl Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.value < 0 { "-" } else { "" };
        let abs = self.value.unsigned_abs();
        let integer = abs / 10000;
        let modulo = abs % 10000;
        let mut result = format!("{sign}{integer}");
        if modulo > 0 {
            let fraction = format!(".{:04}", modulo);
            result.push_str(fraction.trim_end_matches('0'));
        }
        write!(f, "{}", result)
    }
}

impl Serialize for Currency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

/// DATE is a type that specifies date and time information.
/// It is represented as an 8-byte floating-point number:
/// * The date information is represented by whole-number increments, starting with December 30, 1899 midnight as time zero.
/// * The time information is represented by the fraction of a day since the preceding midnight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Date {
    /// Days since the epoch
    pub value: f64,
}

const MAX_DATE_DAYS: f64 = 3_000_000.0;

impl Date {
    /// Converts Date to PrimitiveDateTime
    pub fn to_datetime(&self) -> Option<PrimitiveDateTime> {
        // Beyond the range of time::Date (+-9999 years) either way
        if !self.value.is_finite() || self.value.abs() > MAX_DATE_DAYS {
            return None;
        }
        let date = time::Date::from_calendar_date(1899, time::Month::December, 30)
            .ok()?
            .checked_add(Duration::days(self.value.trunc() as i64))?;
        let tm = (self.value.fract().abs() * 24f64 * 60f64 * 60f64).round() as u64;
        let ss = (tm % 60) as u8;
        let mm = (tm / 60 % 60) as u8;
        let hh = ((tm / 60 / 60) % 24) as u8;
        Some(PrimitiveDateTime::new(
            date,
            time::Time::from_hms(hh, mm, ss).ok()?,
        ))
    }
}

impl Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.to_datetime() {
            Some(dt) => dt.to_string().serialize(serializer),
            None => self.value.serialize(serializer),
        }
    }
}

/// Represents a Windows Runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hresult {
    /// An integer that describes an error.
    pub value: u32,
}

impl Serialize for Hresult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        format!("0x{:08X}", self.value).serialize(serializer)
    }
}

/// Represents a decimal data type that provides a sign and scale for a number
///
/// The number is `value / 10^scale`; `value` must fit into 96 bits to be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decimal {
    /// The unscaled value
    pub value: i128,
    /// Power of 10 by which the value is divided
    pub scale: u8,
}

/// Contains a 64-bit value representing the number of 100-nanosecond intervals since January 1, 1601 (UTC).
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Filetime {
    ticks: u64,
}

impl fmt::Debug for Filetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filetime")
            .field("ticks", &self.ticks)
            .field("as_datetime", &self.as_datetime())
            .finish()
    }
}

impl Filetime {
    /// Creates a Filetime from a raw tick count
    pub fn new(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Creates a Filetime from a datetime
    ///
    /// Returns None if the date precedes 1601-01-01 or is too far in the future
    pub fn from_datetime(dt: OffsetDateTime) -> Option<Self> {
        datetime_to_filetime(dt).map(Self::new)
    }

    /// The raw tick count
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Converts Filetime to OffsetDateTime
    pub fn as_datetime(&self) -> Option<OffsetDateTime> {
        filetime_to_datetime(self.ticks)
    }

    /// Interprets the tick count as a time span (e.g. the total editing time)
    pub fn as_duration(&self) -> Option<Duration> {
        let delta = i64::try_from(self.ticks).ok()?;
        delta.checked_mul(100).map(Duration::nanoseconds)
    }
}

impl Display for Filetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ticks == 0 {
            write!(f, "Not set")
        } else if let Some(dt) = self.as_datetime() {
            write!(f, "{dt}")
        } else {
            write!(f, "Invalid")
        }
    }
}

impl Serialize for Filetime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

/// Represents clipboard data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipboardData {
    /// An application-specific identifier for the format of the data in the data field.
    ///
    /// Negative values are the well known tags (-1 Windows clipboard format,
    /// -2 Macintosh format, -3 FMTID), 0 means no data.
    pub format: i32,
    /// Vector of bytes
    pub data: Vec<u8>,
}

/// One-dimensional array of values of the same type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vector {
    /// The type of the elements, [`vt::VARIANT`] for self-describing elements
    pub element_type: u16,
    /// The elements
    pub items: Vec<Variant>,
}

impl Vector {
    /// Creates a new vector
    pub fn new(element_type: u16, items: Vec<Variant>) -> Self {
        Self {
            element_type,
            items,
        }
    }
}

/// Represents the typed value of a property in a property set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Variant {
    /// VT_EMPTY (0x0000)
    Empty,
    /// VT_NULL (0x0001)
    Null,
    /// VT_I2 (0x0002)
    I2(i16),
    /// VT_I4 (0x0003)
    I4(i32),
    /// VT_R4 (0x0004)
    R4(f32),
    /// VT_R8 (0x0005)
    R8(f64),
    /// VT_CY (0x0006)
    CY(Currency),
    /// VT_DATE (0x0007)
    Date(Date),
    /// VT_BSTR (0x0008)
    BStr(String),
    /// VT_ERROR (0x000A)
    Error(Hresult),
    /// VT_BOOL (0x000B)
    Bool(bool),
    /// VT_DECIMAL (0x000E)
    Decimal(Decimal),
    /// VT_I1 (0x0010)
    I1(i8),
    /// VT_UI1 (0x0011)
    UI1(u8),
    /// VT_UI2 (0x0012)
    UI2(u16),
    /// VT_UI4 (0x0013)
    UI4(u32),
    /// VT_I8 (0x0014)
    I8(i64),
    /// VT_UI8 (0x0015)
    UI8(u64),
    /// VT_INT (0x0016)
    Int(i32),
    /// VT_UINT (0x0017)
    UInt(u32),
    /// VT_LPSTR (0x001E)
    LPStr(String),
    /// VT_LPWSTR (0x001F)
    LPWStr(String),
    /// VT_FILETIME (0x0040)
    Filetime(Filetime),
    /// VT_BLOB (0x0041)
    Blob(Vec<u8>),
    /// VT_BLOB_OBJECT (0x0046)
    BlobObject(Vec<u8>),
    /// VT_CF (0x0047)
    CF(ClipboardData),
    /// VT_CLSID (0x0048)
    Clsid(ClassId),
    /// VT_VECTOR | element type (0x1000 | ...)
    Vector(Vector),
    /// A value which was not decoded, kept verbatim (payload only)
    Unsupported {
        /// The type tag
        vt: u16,
        /// The raw payload, written back as is
        data: Vec<u8>,
    },
}

/// Helper trait
pub(crate) trait FromOlepsReader: Sized {
    /// Read Object from OlePS, propagate codepage to proper structs
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        codepage: CodePage,
        align: bool,
    ) -> Result<Self, HpsfError>;
}

/// Helper trait, the inverse of [`FromOlepsReader`]
pub(crate) trait ToOlepsWriter {
    /// Writes the object, returns the number of bytes written
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        codepage: CodePage,
        align: bool,
    ) -> Result<usize, HpsfError>;
}

macro_rules! oleps_unaligned {
    ($t:ty, $rd:ident, $wr:ident) => {
        impl FromOlepsReader for $t {
            fn from_oleps_reader<R: Read + Seek>(
                reader: &mut R,
                _codepage: CodePage,
                _align: bool,
            ) -> Result<Self, HpsfError> {
                Ok($rd(reader)?)
            }
        }

        impl ToOlepsWriter for $t {
            fn to_oleps_writer<W: Write>(
                &self,
                writer: &mut W,
                _codepage: CodePage,
                _align: bool,
            ) -> Result<usize, HpsfError> {
                Ok($wr(writer, *self)?)
            }
        }
    };
}

oleps_unaligned!(i32, rdi32le, wri32le);
oleps_unaligned!(i64, rdi64le, wri64le);
oleps_unaligned!(u32, rdu32le, wru32le);
oleps_unaligned!(u64, rdu64le, wru64le);
oleps_unaligned!(f32, rdf32le, wrf32le);
oleps_unaligned!(f64, rdf64le, wrf64le);

impl FromOlepsReader for i8 {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        align: bool,
    ) -> Result<Self, HpsfError> {
        let res = rdi8(reader)?;
        if align {
            skip(reader, 3)?;
        }
        Ok(res)
    }
}

impl ToOlepsWriter for i8 {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        align: bool,
    ) -> Result<usize, HpsfError> {
        let mut len = wru8(writer, *self as u8)?;
        if align {
            len += write_zeros(writer, 3)?;
        }
        Ok(len)
    }
}

impl FromOlepsReader for u8 {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        align: bool,
    ) -> Result<Self, HpsfError> {
        let res = rdu8(reader)?;
        if align {
            skip(reader, 3)?;
        }
        Ok(res)
    }
}

impl ToOlepsWriter for u8 {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        align: bool,
    ) -> Result<usize, HpsfError> {
        let mut len = wru8(writer, *self)?;
        if align {
            len += write_zeros(writer, 3)?;
        }
        Ok(len)
    }
}

impl FromOlepsReader for i16 {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        align: bool,
    ) -> Result<Self, HpsfError> {
        let res = rdi16le(reader)?;
        if align {
            skip(reader, 2)?;
        }
        Ok(res)
    }
}

impl ToOlepsWriter for i16 {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        align: bool,
    ) -> Result<usize, HpsfError> {
        let mut len = wri16le(writer, *self)?;
        if align {
            len += write_zeros(writer, 2)?;
        }
        Ok(len)
    }
}

impl FromOlepsReader for u16 {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        align: bool,
    ) -> Result<Self, HpsfError> {
        let res = rdu16le(reader)?;
        if align {
            skip(reader, 2)?;
        }
        Ok(res)
    }
}

impl ToOlepsWriter for u16 {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        align: bool,
    ) -> Result<usize, HpsfError> {
        let mut len = wru16le(writer, *self)?;
        if align {
            len += write_zeros(writer, 2)?;
        }
        Ok(len)
    }
}

impl FromOlepsReader for bool {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        codepage: CodePage,
        align: bool,
    ) -> Result<Self, HpsfError> {
        let data = u16::from_oleps_reader(reader, codepage, align)?;
        Ok(match data {
            0x0000 => false,
            0xFFFF => true,
            _ => {
                debug!("Non canonical VT_BOOL value 0x{data:04x} treated as true");
                true
            }
        })
    }
}

impl ToOlepsWriter for bool {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        codepage: CodePage,
        align: bool,
    ) -> Result<usize, HpsfError> {
        let v: u16 = if *self { 0xFFFF } else { 0x0000 };
        v.to_oleps_writer(writer, codepage, align)
    }
}

impl FromOlepsReader for Currency {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<Self, HpsfError> {
        Ok(Currency {
            value: rdi64le(reader)?,
        })
    }
}

impl ToOlepsWriter for Currency {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<usize, HpsfError> {
        Ok(wri64le(writer, self.value)?)
    }
}

impl FromOlepsReader for Date {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<Self, HpsfError> {
        Ok(Date {
            value: rdf64le(reader)?,
        })
    }
}

impl ToOlepsWriter for Date {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<usize, HpsfError> {
        Ok(wrf64le(writer, self.value)?)
    }
}

impl FromOlepsReader for Hresult {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<Self, HpsfError> {
        Ok(Hresult {
            value: rdu32le(reader)?,
        })
    }
}

impl ToOlepsWriter for Hresult {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<usize, HpsfError> {
        Ok(wru32le(writer, self.value)?)
    }
}

impl FromOlepsReader for Filetime {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<Self, HpsfError> {
        Ok(Filetime {
            ticks: rdu64le(reader)?,
        })
    }
}

impl ToOlepsWriter for Filetime {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<usize, HpsfError> {
        Ok(wru64le(writer, self.ticks)?)
    }
}

const DECIMAL_SIGN_NEGATIVE: u8 = 0x80;

impl FromOlepsReader for Decimal {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<Self, HpsfError> {
        let _reserved = rdu16le(reader)?;
        let scale = rdu8(reader)?;
        let sign = rdu8(reader)?;
        let hi32 = rdu32le(reader)?;
        let lo64 = rdu64le(reader)?;

        let mut value = (i128::from(hi32) << 64) | i128::from(lo64);
        if sign == DECIMAL_SIGN_NEGATIVE {
            value *= -1;
        }

        Ok(Decimal { value, scale })
    }
}

impl ToOlepsWriter for Decimal {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<usize, HpsfError> {
        let abs = self.value.unsigned_abs();
        if abs >> 96 != 0 {
            return Err(HpsfError::UnsupportedWriteVariant(format!(
                "decimal {} exceeds 96 bits",
                self.value
            )));
        }
        let sign = if self.value < 0 {
            DECIMAL_SIGN_NEGATIVE
        } else {
            0
        };
        let mut len = wru16le(writer, 0)?;
        len += wru8(writer, self.scale)?;
        len += wru8(writer, sign)?;
        len += wru32le(writer, (abs >> 64) as u32)?;
        len += wru64le(writer, abs as u64)?;
        Ok(len)
    }
}

impl FromOlepsReader for ClipboardData {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<Self, HpsfError> {
        let size = rdu32le(reader)?;
        let data_size = size.checked_sub(4).ok_or_else(|| {
            HpsfError::malformed(format!("Invalid ClipboardData size ({size})"))
        })?;
        let format = rdi32le(reader)?;
        let data = read_bytes(reader, u64::from(data_size))?;
        skip(reader, padlen4(into_usize(size)?))?;
        Ok(ClipboardData { format, data })
    }
}

impl ToOlepsWriter for ClipboardData {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<usize, HpsfError> {
        let size = into_u32(self.data.len() + 4, "clipboard data")?;
        let mut len = wru32le(writer, size)?;
        len += wri32le(writer, self.format)?;
        writer.write_all(&self.data)?;
        len += self.data.len();
        len += wrpad4(writer, self.data.len())?;
        Ok(len)
    }
}

impl FromOlepsReader for ClassId {
    fn from_oleps_reader<R: Read + Seek>(
        reader: &mut R,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<Self, HpsfError> {
        let mut bytes = [0u8; 16];
        reader.read_exact(&mut bytes)?;
        Ok(ClassId::from_bytes(bytes))
    }
}

impl ToOlepsWriter for ClassId {
    fn to_oleps_writer<W: Write>(
        &self,
        writer: &mut W,
        _codepage: CodePage,
        _align: bool,
    ) -> Result<usize, HpsfError> {
        writer.write_all(self.as_bytes())?;
        Ok(ClassId::LENGTH)
    }
}

/// Truncates raw string data at the first terminator
fn strip_nul(mut data: Vec<u8>, unicode: bool) -> Vec<u8> {
    let end = if unicode {
        // This is technically invalid, but that's what Windows does
        data.truncate(data.len() & !1);
        data.chunks_exact(2)
            .position(|c| c == [0, 0])
            .map(|p| p * 2)
    } else {
        data.iter().position(|b| *b == 0)
    };
    if let Some(end) = end {
        data.truncate(end);
    }
    data
}

/// Reads a CodepageString (`VT_LPSTR` and `VT_BSTR` payloads)
///
/// The size is in bytes and includes the terminator
fn read_codepage_string<R: Read + Seek>(
    reader: &mut R,
    codepage: CodePage,
    align: bool,
) -> Result<String, HpsfError> {
    let size = rdu32le(reader)?;
    let data = read_bytes(reader, u64::from(size))?;
    if align || codepage::is_unicode(codepage) {
        skip(reader, padlen4(data.len()))?;
    }
    codepage::decode_str(&strip_nul(data, codepage::is_unicode(codepage)), codepage)
}

fn write_codepage_string<W: Write>(
    writer: &mut W,
    text: &str,
    codepage: CodePage,
    align: bool,
) -> Result<usize, HpsfError> {
    let mut data = codepage::encode_str(text, codepage)?;
    data.resize(data.len() + codepage::nul_len(codepage), 0);
    let mut len = wru32le(writer, into_u32(data.len(), "string")?)?;
    writer.write_all(&data)?;
    len += data.len();
    if align || codepage::is_unicode(codepage) {
        len += wrpad4(writer, data.len())?;
    }
    Ok(len)
}

/// Reads a UnicodeString (`VT_LPWSTR` payload)
///
/// The size is in UTF-16 code units and includes the terminator
fn read_unicode_string<R: Read + Seek>(reader: &mut R) -> Result<String, HpsfError> {
    let nchars = rdu32le(reader)?;
    let data = read_bytes(reader, u64::from(nchars) * 2)?;
    // Realign in case length is odd
    skip(reader, into_usize(nchars & 1)? * 2)?;
    codepage::decode_str(&strip_nul(data, true), codepage::CP_UNICODE)
}

fn write_unicode_string<W: Write>(writer: &mut W, text: &str) -> Result<usize, HpsfError> {
    let data = codepage::encode_str(text, codepage::CP_UNICODE)?;
    let nchars = data.len() / 2 + 1;
    let mut len = wru32le(writer, into_u32(nchars, "string")?)?;
    writer.write_all(&data)?;
    len += data.len();
    len += wru16le(writer, 0)?;
    if nchars & 1 != 0 {
        len += wru16le(writer, 0)?;
    }
    Ok(len)
}

fn read_blob<R: Read + Seek>(reader: &mut R) -> Result<Vec<u8>, HpsfError> {
    let size = rdu32le(reader)?;
    let bytes = read_bytes(reader, u64::from(size))?;
    skip(reader, padlen4(bytes.len()))?;
    Ok(bytes)
}

fn write_blob<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<usize, HpsfError> {
    let mut len = wru32le(writer, into_u32(bytes.len(), "blob")?)?;
    writer.write_all(bytes)?;
    len += bytes.len();
    len += wrpad4(writer, bytes.len())?;
    Ok(len)
}

fn is_codepage_string(tag: u16) -> bool {
    tag == vt::LPSTR || tag == vt::BSTR
}

/// Element types allowed in a `VT_VECTOR`
fn is_vector_element(tag: u16) -> bool {
    matches!(
        tag,
        vt::I2
            | vt::I4
            | vt::R4
            | vt::R8
            | vt::CY
            | vt::DATE
            | vt::BSTR
            | vt::ERROR
            | vt::BOOL
            | vt::VARIANT
            | vt::I1
            | vt::UI1
            | vt::UI2
            | vt::UI4
            | vt::I8
            | vt::UI8
            | vt::LPSTR
            | vt::LPWSTR
            | vt::FILETIME
            | vt::CF
            | vt::CLSID
    )
}

impl Vector {
    fn read<R: Read + Seek>(
        reader: &mut R,
        element_type: u16,
        codepage: CodePage,
    ) -> Result<Self, HpsfError> {
        let start = reader.stream_position()?;
        let nitems = rdu32le(reader)?;
        let mut items = Vec::with_capacity(into_usize(nitems)?.min(1024));
        for _ in 0..nitems {
            let item = if element_type == vt::VARIANT {
                let tag = read_type_tag(reader)?;
                Variant::read_value(reader, tag, codepage, !is_codepage_string(tag))?
            } else {
                Variant::read_value(reader, element_type, codepage, false)?
            };
            items.push(item);
        }
        let len = reader.stream_position()? - start;
        skip(reader, padlen4(into_usize(len)?))?;
        Ok(Self {
            element_type,
            items,
        })
    }

    fn write<W: Write>(&self, writer: &mut W, codepage: CodePage) -> Result<usize, HpsfError> {
        if !is_vector_element(self.element_type) {
            return Err(HpsfError::UnsupportedWriteVariant(format!(
                "vector of {}",
                vt_name(self.element_type)
            )));
        }
        let mut len = wru32le(writer, into_u32(self.items.len(), "vector")?)?;
        for item in &self.items {
            let tag = item.vt();
            if matches!(item, Variant::Vector(_) | Variant::Unsupported { .. }) {
                return Err(HpsfError::UnsupportedWriteVariant(format!(
                    "{} inside a vector",
                    vt_name(tag)
                )));
            }
            if self.element_type == vt::VARIANT {
                len += wru16le(writer, tag)?;
                len += wru16le(writer, 0)?;
                len += item.write_value(writer, codepage, !is_codepage_string(tag))?;
            } else if tag == self.element_type {
                len += item.write_value(writer, codepage, false)?;
            } else {
                return Err(HpsfError::UnsupportedWriteVariant(format!(
                    "{} inside a vector of {}",
                    vt_name(tag),
                    vt_name(self.element_type)
                )));
            }
        }
        len += wrpad4(writer, len)?;
        Ok(len)
    }
}

impl Variant {
    /// The type tag of this value
    pub fn vt(&self) -> u16 {
        match self {
            Self::Empty => vt::EMPTY,
            Self::Null => vt::NULL,
            Self::I2(_) => vt::I2,
            Self::I4(_) => vt::I4,
            Self::R4(_) => vt::R4,
            Self::R8(_) => vt::R8,
            Self::CY(_) => vt::CY,
            Self::Date(_) => vt::DATE,
            Self::BStr(_) => vt::BSTR,
            Self::Error(_) => vt::ERROR,
            Self::Bool(_) => vt::BOOL,
            Self::Decimal(_) => vt::DECIMAL,
            Self::I1(_) => vt::I1,
            Self::UI1(_) => vt::UI1,
            Self::UI2(_) => vt::UI2,
            Self::UI4(_) => vt::UI4,
            Self::I8(_) => vt::I8,
            Self::UI8(_) => vt::UI8,
            Self::Int(_) => vt::INT,
            Self::UInt(_) => vt::UINT,
            Self::LPStr(_) => vt::LPSTR,
            Self::LPWStr(_) => vt::LPWSTR,
            Self::Filetime(_) => vt::FILETIME,
            Self::Blob(_) => vt::BLOB,
            Self::BlobObject(_) => vt::BLOB_OBJECT,
            Self::CF(_) => vt::CF,
            Self::Clsid(_) => vt::CLSID,
            Self::Vector(v) => vt::VECTOR | v.element_type,
            Self::Unsupported { vt, .. } => *vt,
        }
    }

    /// Returns the text of string values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::LPStr(s) | Self::LPWStr(s) | Self::BStr(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value of integer types
    pub fn as_i64(&self) -> Option<i64> {
        Some(match self {
            Self::I1(v) => i64::from(*v),
            Self::UI1(v) => i64::from(*v),
            Self::I2(v) => i64::from(*v),
            Self::UI2(v) => i64::from(*v),
            Self::I4(v) | Self::Int(v) => i64::from(*v),
            Self::UI4(v) | Self::UInt(v) => i64::from(*v),
            Self::I8(v) => *v,
            Self::UI8(v) => i64::try_from(*v).ok()?,
            _ => return None,
        })
    }

    /// Returns the value of `VT_BOOL`s
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value of `VT_FILETIME`s
    pub fn as_filetime(&self) -> Option<Filetime> {
        match self {
            Self::Filetime(v) => Some(*v),
            _ => None,
        }
    }

    /// Indicates whether this value is an undecoded placeholder
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Reads a scalar value
    fn read_value<R: Read + Seek>(
        reader: &mut R,
        tag: u16,
        codepage: CodePage,
        align: bool,
    ) -> Result<Self, HpsfError> {
        use Variant as V;
        let value = match tag {
            vt::EMPTY => V::Empty,
            vt::NULL => V::Null,
            vt::I2 => V::I2(i16::from_oleps_reader(reader, codepage, align)?),
            vt::I4 => V::I4(i32::from_oleps_reader(reader, codepage, align)?),
            vt::R4 => V::R4(f32::from_oleps_reader(reader, codepage, align)?),
            vt::R8 => V::R8(f64::from_oleps_reader(reader, codepage, align)?),
            vt::CY => V::CY(Currency::from_oleps_reader(reader, codepage, align)?),
            vt::DATE => V::Date(Date::from_oleps_reader(reader, codepage, align)?),
            vt::BSTR => V::BStr(read_codepage_string(reader, codepage, align)?),
            vt::ERROR => V::Error(Hresult::from_oleps_reader(reader, codepage, align)?),
            vt::BOOL => V::Bool(bool::from_oleps_reader(reader, codepage, align)?),
            vt::DECIMAL => V::Decimal(Decimal::from_oleps_reader(reader, codepage, align)?),
            vt::I1 => V::I1(i8::from_oleps_reader(reader, codepage, align)?),
            vt::UI1 => V::UI1(u8::from_oleps_reader(reader, codepage, align)?),
            vt::UI2 => V::UI2(u16::from_oleps_reader(reader, codepage, align)?),
            vt::UI4 => V::UI4(u32::from_oleps_reader(reader, codepage, align)?),
            vt::I8 => V::I8(i64::from_oleps_reader(reader, codepage, align)?),
            vt::UI8 => V::UI8(u64::from_oleps_reader(reader, codepage, align)?),
            vt::INT => V::Int(i32::from_oleps_reader(reader, codepage, align)?),
            vt::UINT => V::UInt(u32::from_oleps_reader(reader, codepage, align)?),
            vt::LPSTR => V::LPStr(read_codepage_string(reader, codepage, align)?),
            vt::LPWSTR => V::LPWStr(read_unicode_string(reader)?),
            vt::FILETIME => V::Filetime(Filetime::from_oleps_reader(reader, codepage, align)?),
            vt::BLOB => V::Blob(read_blob(reader)?),
            vt::BLOB_OBJECT => V::BlobObject(read_blob(reader)?),
            vt::CF => V::CF(ClipboardData::from_oleps_reader(reader, codepage, align)?),
            vt::CLSID => V::Clsid(ClassId::from_oleps_reader(reader, codepage, align)?),
            _ => return Err(HpsfError::UnsupportedVariantType(u32::from(tag))),
        };
        Ok(value)
    }

    /// Writes a scalar value
    fn write_value<W: Write>(
        &self,
        writer: &mut W,
        codepage: CodePage,
        align: bool,
    ) -> Result<usize, HpsfError> {
        match self {
            Self::Empty | Self::Null => Ok(0),
            Self::I2(v) => v.to_oleps_writer(writer, codepage, align),
            Self::I4(v) | Self::Int(v) => v.to_oleps_writer(writer, codepage, align),
            Self::R4(v) => v.to_oleps_writer(writer, codepage, align),
            Self::R8(v) => v.to_oleps_writer(writer, codepage, align),
            Self::CY(v) => v.to_oleps_writer(writer, codepage, align),
            Self::Date(v) => v.to_oleps_writer(writer, codepage, align),
            Self::BStr(s) | Self::LPStr(s) => write_codepage_string(writer, s, codepage, align),
            Self::Error(v) => v.to_oleps_writer(writer, codepage, align),
            Self::Bool(v) => v.to_oleps_writer(writer, codepage, align),
            Self::Decimal(v) => v.to_oleps_writer(writer, codepage, align),
            Self::I1(v) => v.to_oleps_writer(writer, codepage, align),
            Self::UI1(v) => v.to_oleps_writer(writer, codepage, align),
            Self::UI2(v) => v.to_oleps_writer(writer, codepage, align),
            Self::UI4(v) | Self::UInt(v) => v.to_oleps_writer(writer, codepage, align),
            Self::I8(v) => v.to_oleps_writer(writer, codepage, align),
            Self::UI8(v) => v.to_oleps_writer(writer, codepage, align),
            Self::LPWStr(s) => write_unicode_string(writer, s),
            Self::Filetime(v) => v.to_oleps_writer(writer, codepage, align),
            Self::Blob(b) | Self::BlobObject(b) => write_blob(writer, b),
            Self::CF(v) => v.to_oleps_writer(writer, codepage, align),
            Self::Clsid(v) => v.to_oleps_writer(writer, codepage, align),
            Self::Vector(v) => v.write(writer, codepage),
            Self::Unsupported { data, .. } => {
                writer.write_all(data)?;
                Ok(data.len() + wrpad4(writer, data.len())?)
            }
        }
    }

    /// Reads a property payload of type `tag`
    pub(crate) fn read_payload<R: Read + Seek>(
        reader: &mut R,
        tag: u16,
        codepage: CodePage,
    ) -> Result<Self, HpsfError> {
        match tag & !vt::TYPE_MASK {
            0 => Self::read_value(reader, tag, codepage, true),
            vt::VECTOR if is_vector_element(tag & vt::TYPE_MASK) => Ok(Self::Vector(
                Vector::read(reader, tag & vt::TYPE_MASK, codepage)?,
            )),
            _ => Err(HpsfError::UnsupportedVariantType(u32::from(tag))),
        }
    }

    /// Writes the payload (no type tag), padded to a multiple of 4 bytes
    pub(crate) fn write_payload<W: Write>(
        &self,
        writer: &mut W,
        codepage: CodePage,
    ) -> Result<usize, HpsfError> {
        self.write_value(writer, codepage, true)
    }

    /// Writes a full TypedPropertyValue (type tag, padding and payload)
    pub(crate) fn write<W: Write>(
        &self,
        writer: &mut W,
        codepage: CodePage,
    ) -> Result<usize, HpsfError> {
        let mut len = wru16le(writer, self.vt())?;
        len += wru16le(writer, 0)?;
        len += self.write_payload(writer, codepage)?;
        Ok(len)
    }
}

/// Decodes the payload of type `tag` found at `offset` in `data`
///
/// A `codepage` of `None` means the default codepage.
///
/// Returns the value and the number of bytes consumed, padding included. Unsupported
/// types yield a [`Variant::Unsupported`] holding the remainder of `data`.
pub fn decode(
    data: &[u8],
    offset: usize,
    tag: u16,
    codepage: Option<CodePage>,
) -> Result<(Variant, usize), HpsfError> {
    decode_with(data, offset, tag, codepage, &CodecOptions::default())
}

/// Like [`decode`] with explicit options
pub fn decode_with(
    data: &[u8],
    offset: usize,
    tag: u16,
    codepage: Option<CodePage>,
    options: &CodecOptions,
) -> Result<(Variant, usize), HpsfError> {
    let codepage = codepage.unwrap_or(options.default_codepage);
    let payload = data.get(offset..).ok_or_else(|| {
        HpsfError::malformed(format!(
            "Offset {offset} is beyond the end of data ({})",
            data.len()
        ))
    })?;
    let mut reader = Cursor::new(payload);
    match Variant::read_payload(&mut reader, tag, codepage) {
        Ok(value) => {
            let consumed = into_usize(reader.position())?.min(payload.len());
            Ok((value, consumed))
        }
        Err(HpsfError::UnsupportedVariantType(_))
            if options.unsupported_variant == Policy::Tolerate =>
        {
            if options.log_unsupported {
                warn!("Unsupported type {} kept as raw data", vt_name(tag));
            } else {
                debug!("Unsupported type {} kept as raw data", vt_name(tag));
            }
            Ok((
                Variant::Unsupported {
                    vt: tag,
                    data: payload.to_vec(),
                },
                payload.len(),
            ))
        }
        Err(e) => Err(e),
    }
}

/// Encodes the payload of `value`, padded to a multiple of 4 bytes
///
/// A `codepage` of `None` means the default codepage.
pub fn encode(value: &Variant, codepage: Option<CodePage>) -> Result<Vec<u8>, HpsfError> {
    let mut out = Vec::new();
    value.write_payload(&mut out, codepage.unwrap_or(codepage::DEFAULT_CODEPAGE))?;
    Ok(out)
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "<empty>"),
            Self::Null => write!(f, "<null>"),
            Self::I2(v) => write!(f, "{v}"),
            Self::I4(v) | Self::Int(v) => write!(f, "{v}"),
            Self::R4(v) => write!(f, "{v}"),
            Self::R8(v) => write!(f, "{v}"),
            Self::CY(v) => write!(f, "{v}"),
            Self::Date(v) => match v.to_datetime() {
                Some(dt) => write!(f, "{dt}"),
                None => write!(f, "{}", v.value),
            },
            Self::BStr(s) | Self::LPStr(s) | Self::LPWStr(s) => write!(f, "{s}"),
            Self::Error(v) => write!(f, "0x{:08X}", v.value),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{}e-{}", v.value, v.scale),
            Self::I1(v) => write!(f, "{v}"),
            Self::UI1(v) => write!(f, "{v}"),
            Self::UI2(v) => write!(f, "{v}"),
            Self::UI4(v) | Self::UInt(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::UI8(v) => write!(f, "{v}"),
            Self::Filetime(v) => write!(f, "{v}"),
            Self::Blob(b) | Self::BlobObject(b) => write!(f, "<{} bytes>", b.len()),
            Self::CF(cf) => write!(f, "<clipboard format {}, {} bytes>", cf.format, cf.data.len()),
            Self::Clsid(v) => write!(f, "{v}"),
            Self::Vector(v) => {
                write!(f, "[")?;
                for (i, item) in v.items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Unsupported { vt, data } => {
                write!(f, "<{}, {} bytes undecoded>", vt_name(*vt), data.len())
            }
        }
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Self::LPStr(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Self::LPStr(v.to_string())
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i16> for Variant {
    fn from(v: i16) -> Self {
        Self::I2(v)
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Self::I4(v)
    }
}

impl From<u32> for Variant {
    fn from(v: u32) -> Self {
        Self::UI4(v)
    }
}

impl From<i64> for Variant {
    fn from(v: i64) -> Self {
        Self::I8(v)
    }
}

impl From<u64> for Variant {
    fn from(v: u64) -> Self {
        Self::UI8(v)
    }
}

impl From<f32> for Variant {
    fn from(v: f32) -> Self {
        Self::R4(v)
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Self::R8(v)
    }
}

impl From<Filetime> for Variant {
    fn from(v: Filetime) -> Self {
        Self::Filetime(v)
    }
}

/// Dates outside of the FILETIME range are stored as the zero FILETIME
impl From<OffsetDateTime> for Variant {
    fn from(v: OffsetDateTime) -> Self {
        Self::Filetime(Filetime::from_datetime(v).unwrap_or_default())
    }
}
