//! Class and format identifiers
use crate::error::HpsfError;
use ctxutils::win32::GUID;
use serde::{Serialize, Serializer};
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

/// A 16 byte class (or format) identifier, kept in its on-disk byte order
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassId([u8; 16]);

impl ClassId {
    /// Length in bytes of a serialized `ClassId`
    pub const LENGTH: usize = 16;

    /// The all zero identifier
    pub const NULL: Self = Self([0u8; 16]);

    /// FMTID_SummaryInformation `{F29F85E0-4FF9-1068-AB91-08002B27B3D9}`
    pub const SUMMARY_INFORMATION: Self = Self([
        0xe0, 0x85, 0x9f, 0xf2, 0xf9, 0x4f, 0x68, 0x10, 0xab, 0x91, 0x08, 0x00, 0x2b, 0x27, 0xb3,
        0xd9,
    ]);

    /// FMTID_DocSummaryInformation `{D5CDD502-2E9C-101B-9397-08002B2CF9AE}`
    pub const DOC_SUMMARY_INFORMATION: Self = Self([
        0x02, 0xd5, 0xcd, 0xd5, 0x9c, 0x2e, 0x1b, 0x10, 0x93, 0x97, 0x08, 0x00, 0x2b, 0x2c, 0xf9,
        0xae,
    ]);

    /// FMTID_UserDefinedProperties `{D5CDD505-2E9C-101B-9397-08002B2CF9AE}`
    pub const USER_DEFINED_PROPERTIES: Self = Self([
        0x05, 0xd5, 0xcd, 0xd5, 0x9c, 0x2e, 0x1b, 0x10, 0x93, 0x97, 0x08, 0x00, 0x2b, 0x2c, 0xf9,
        0xae,
    ]);

    /// Creates a `ClassId` from its 16 raw bytes
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the 16 raw bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Reads a `ClassId` from `buf` at `offset`
    pub fn read(buf: &[u8], offset: usize) -> Result<Self, HpsfError> {
        let src = buf
            .get(offset..)
            .and_then(|b| b.get(..Self::LENGTH))
            .ok_or(HpsfError::BufferTooSmall {
                needed: Self::LENGTH,
                available: buf.len().saturating_sub(offset),
            })?;
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(src);
        Ok(Self(bytes))
    }

    /// Writes the `ClassId` into `buf` at `offset`
    ///
    /// Fails if fewer than 16 bytes are available from `offset`
    pub fn write(&self, buf: &mut [u8], offset: usize) -> Result<(), HpsfError> {
        let available = buf.len().saturating_sub(offset);
        let dst = buf
            .get_mut(offset..)
            .and_then(|b| b.get_mut(..Self::LENGTH))
            .ok_or(HpsfError::BufferTooSmall {
                needed: Self::LENGTH,
                available,
            })?;
        dst.copy_from_slice(&self.0);
        Ok(())
    }

    /// Check whether this is the all zero identifier
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    fn as_guid(&self) -> GUID {
        GUID::from_le_bytes(&self.0)
    }
}

impl From<GUID> for ClassId {
    fn from(guid: GUID) -> Self {
        Self(guid.to_le_bytes())
    }
}

impl From<ClassId> for GUID {
    fn from(id: ClassId) -> Self {
        id.as_guid()
    }
}

impl Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_guid().to_string().to_uppercase())
    }
}

impl Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self)
    }
}

impl FromStr for ClassId {
    type Err = ();

    /// Parses the `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX` form, with or without braces
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(s);
        GUID::from_str(s).map(Self::from)
    }
}

impl Serialize for ClassId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}
