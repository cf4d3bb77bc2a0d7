//! A typed value associated with a property identifier
use crate::codepage::CodePage;
use crate::config::{CodecOptions, Policy};
use crate::error::HpsfError;
use crate::variant::{self, decode_with, vt_name, Variant};
use serde::Serialize;
use std::io::Write;
use tracing::{debug, warn};

/// A property: an identifier and a typed value
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    /// The property identifier
    pub id: u32,
    /// The typed value
    pub value: Variant,
}

impl Property {
    /// Creates a new property
    pub fn new<V: Into<Variant>>(id: u32, value: V) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }

    /// The variant type of the value
    pub fn vt(&self) -> u16 {
        self.value.vt()
    }

    /// Size in bytes of the serialized value: type tag and padded payload
    pub fn body_len(&self, codepage: CodePage) -> Result<usize, HpsfError> {
        Ok(4 + variant::encode(&self.value, Some(codepage))?.len())
    }

    /// Size in bytes taken in a section: the id/offset table entry and the body
    pub fn size(&self, codepage: CodePage) -> Result<usize, HpsfError> {
        Ok(8 + self.body_len(codepage)?)
    }

    pub(crate) fn write<W: Write>(
        &self,
        writer: &mut W,
        codepage: CodePage,
    ) -> Result<usize, HpsfError> {
        self.value.write(writer, codepage)
    }

    /// Decodes the property body found at `offset` in `data`
    ///
    /// `data` must end where the property ends (i.e. at the next property or at the
    /// end of the section). Problems which only affect this property are subject to
    /// [`CodecOptions::malformed_property`]: when tolerated the raw body is kept as a
    /// [`Variant::Unsupported`] and a description is added to `anomalies`.
    pub fn decode(
        data: &[u8],
        offset: usize,
        id: u32,
        codepage: CodePage,
        options: &CodecOptions,
        anomalies: &mut Vec<String>,
    ) -> Result<Self, HpsfError> {
        let body = data
            .get(offset..)
            .filter(|body| body.len() >= 4)
            .ok_or_else(|| {
                HpsfError::malformed(format!(
                    "Property 0x{id:08x} at offset {offset} has no room for its type"
                ))
            })?;
        let tag = u16::from_le_bytes([body[0], body[1]]);
        let padding = u16::from_le_bytes([body[2], body[3]]);
        let res = if padding != 0 {
            Err(HpsfError::malformed(format!(
                "Invalid padding {padding:x} found in property with type 0x{tag:x}"
            )))
        } else {
            decode_with(body, 4, tag, Some(codepage), options).map(|(value, _)| value)
        };
        match res {
            Ok(value) => {
                if value.is_unsupported() {
                    anomalies.push(format!(
                        "Property 0x{id:08x} has unsupported type {}",
                        vt_name(tag)
                    ));
                }
                Ok(Self { id, value })
            }
            Err(e)
                if options.malformed_property == Policy::Tolerate
                    && !matches!(
                        e,
                        HpsfError::UnsupportedVariantType(_) | HpsfError::Io(_)
                    ) =>
            {
                let msg = format!("Property 0x{id:08x} ({}) kept undecoded: {e}", vt_name(tag));
                if options.log_unsupported {
                    warn!("{msg}");
                } else {
                    debug!("{msg}");
                }
                anomalies.push(msg);
                Ok(Self {
                    id,
                    value: Variant::Unsupported {
                        vt: tag,
                        data: body[4..].to_vec(),
                    },
                })
            }
            Err(e) => Err(e),
        }
    }
}

/// Properties are equal if their ids and values match; a `VT_LPSTR` and a `VT_LPWSTR`
/// with the same text are considered equal
impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        if self.id != other.id {
            return false;
        }
        match (&self.value, &other.value) {
            (Variant::LPStr(a), Variant::LPWStr(b)) | (Variant::LPWStr(a), Variant::LPStr(b)) => {
                a == b
            }
            (a, b) => a == b,
        }
    }
}
