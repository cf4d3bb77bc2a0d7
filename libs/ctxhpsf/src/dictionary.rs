//! Mapping between property identifiers and property names
use crate::codepage::{self, CodePage, CP_UNICODE};
use crate::error::HpsfError;
use crate::section::Section;
use ctxutils::io::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

/// Represents all mappings between property identifiers and property names in a section.
///
/// Stored as the special property 0, which has no type tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dictionary {
    entries: BTreeMap<u32, String>,
}

impl Dictionary {
    /// Creates an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the dictionary found at `offset` in `data`
    ///
    /// The length of each name is in characters (including the terminator): bytes
    /// for ANSI codepages, UTF-16 code units for Unicode where names are also padded
    /// to a multiple of 4 bytes.
    ///
    /// Returns the dictionary and the number of bytes consumed.
    pub fn read(
        data: &[u8],
        offset: usize,
        codepage: CodePage,
    ) -> Result<(Self, usize), HpsfError> {
        let data = data.get(offset..).ok_or_else(|| {
            HpsfError::malformed(format!("Dictionary offset {offset} is out of bounds"))
        })?;
        let mut reader = Cursor::new(data);
        let num_entries = rdu32le(&mut reader)?;
        let mut entries = BTreeMap::new();
        for _ in 0..num_entries {
            let id = rdu32le(&mut reader)?;
            let nchars = rdu32le(&mut reader)?;

            // Note: the name is not a CodepageString because:
            // - size is in chars, not bytes
            // - it is not padded unless it's in CP_WINUNICODE
            let (size, padlen) = if codepage::is_unicode(codepage) {
                let size = nchars.checked_mul(2).ok_or_else(|| {
                    HpsfError::malformed("DictionaryEntry size overflow")
                })?;
                (size, (nchars & 1) * 2)
            } else {
                (nchars, 0)
            };
            let available = data.len() as u64 - reader.position();
            if u64::from(size) > available {
                return Err(HpsfError::malformed(format!(
                    "Dictionary name length {size} exceeds the {available} bytes available"
                )));
            }
            let mut name = vec![0u8; size as usize];
            reader.read_exact(&mut name)?;
            reader.seek(SeekFrom::Current(i64::from(padlen)))?;

            let nul = codepage::nul_len(codepage);
            if let Some(end) = name.chunks_exact(nul).position(|c| c.iter().all(|b| *b == 0)) {
                name.truncate(end * nul);
            }
            let name = codepage::decode_str(&name, codepage)?;
            // Only the first occurrence of an id counts
            entries.entry(id).or_insert(name);
        }
        let size = reader.position() as usize;
        Ok((Self { entries }, (size + padlen4(size)).min(data.len())))
    }

    /// Writes the dictionary, returns the number of bytes written
    ///
    /// Only Unicode dictionaries can be written.
    pub fn write<W: Write>(&self, writer: &mut W, codepage: CodePage) -> Result<usize, HpsfError> {
        if codepage != CP_UNICODE {
            return Err(HpsfError::UnsupportedWriteVariant(format!(
                "dictionary in codepage {codepage}"
            )));
        }
        let num_entries = u32::try_from(self.entries.len())
            .map_err(|_| HpsfError::UnsupportedWriteVariant("dictionary is too large".into()))?;
        let mut len = wru32le(writer, num_entries)?;
        for (id, name) in &self.entries {
            let mut data = codepage::encode_str(name, codepage)?;
            data.extend_from_slice(&[0, 0]);
            let nchars = u32::try_from(data.len() / 2).map_err(|_| {
                HpsfError::UnsupportedWriteVariant("dictionary name is too long".into())
            })?;
            len += wru32le(writer, *id)?;
            len += wru32le(writer, nchars)?;
            writer.write_all(&data)?;
            len += data.len();
            if nchars & 1 != 0 {
                len += wru16le(writer, 0)?;
            }
        }
        len += wrpad4(writer, len)?;
        Ok(len)
    }

    /// Returns the name of a property
    pub fn get(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(|s| s.as_str())
    }

    /// Returns the (lowest) id mapped to `name`
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find_map(|(id, n)| (n == name).then_some(*id))
    }

    /// Maps `id` to `name`, returns the previous name
    pub fn insert<S: Into<String>>(&mut self, id: u32, name: S) -> Option<String> {
        self.entries.insert(id, name.into())
    }

    /// Removes the mapping for `id`, returns the name
    pub fn remove(&mut self, id: u32) -> Option<String> {
        self.entries.remove(&id)
    }

    /// Checks whether `id` has a name
    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the `(id, name)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Checks that every entry names exactly one property of `section`
    ///
    /// That is: each id has a property and no two ids share the same name.
    pub fn is_pure(&self, section: &Section) -> bool {
        let mut names = HashSet::with_capacity(self.entries.len());
        self.entries
            .iter()
            .all(|(id, name)| section.property(*id).is_some() && names.insert(name.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (u32, S)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }
}
