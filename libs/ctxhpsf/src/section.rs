//! Sections: a format identifier, a set of properties and an optional dictionary
//!
//! On disk (offsets relative to the start of the section):
//! ```text
//! size:u32 count:u32 {id:u32 offset:u32} * count  bodies...
//! ```
use crate::classid::ClassId;
use crate::codepage::{CodePage, CODEPAGE_UNSET, CP_UNICODE, DEFAULT_CODEPAGE};
use crate::config::{CodecOptions, Policy};
use crate::dictionary::Dictionary;
use crate::error::HpsfError;
use crate::property::Property;
use crate::property_ids::*;
use crate::variant::Variant;
use ctxutils::io::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Write};
use tracing::{debug, warn};

/// A section of a property set
#[derive(Debug, Clone, Default, Serialize)]
pub struct Section {
    format_id: Option<ClassId>,
    properties: BTreeMap<u32, Property>,
    dictionary: Option<Dictionary>,
    #[serde(skip)]
    declared_size: Option<u32>,
    #[serde(skip)]
    anomalies: Vec<String>,
}

fn tolerate(
    options: &CodecOptions,
    anomalies: &mut Vec<String>,
    id: u32,
    e: HpsfError,
) -> Result<(), HpsfError> {
    if options.malformed_property == Policy::Fail
        || matches!(e, HpsfError::UnsupportedVariantType(_) | HpsfError::Io(_))
    {
        return Err(e);
    }
    let msg = format!("Property 0x{id:08x} skipped: {e}");
    if options.log_unsupported {
        warn!("{msg}");
    } else {
        debug!("{msg}");
    }
    anomalies.push(msg);
    Ok(())
}

impl Section {
    /// Creates an empty section with the given format identifier
    pub fn new(format_id: ClassId) -> Self {
        Self {
            format_id: Some(format_id),
            ..Self::default()
        }
    }

    /// Parses the section found at `offset` in `data`
    ///
    /// Inconsistent framing (size, count, table) is an error; problems limited to
    /// a single property follow [`CodecOptions::malformed_property`].
    pub fn parse(
        data: &[u8],
        offset: usize,
        format_id: ClassId,
        options: &CodecOptions,
    ) -> Result<Self, HpsfError> {
        let tail = data.get(offset..).ok_or_else(|| {
            HpsfError::malformed(format!("Section offset {offset} is out of bounds"))
        })?;
        let mut reader = Cursor::new(tail);
        let size = rdu32le(&mut reader)?;
        let num_properties = rdu32le(&mut reader)?;
        let section = tail.get(..size as usize).ok_or_else(|| {
            HpsfError::malformed(format!(
                "Section size {size} exceeds the {} bytes available",
                tail.len()
            ))
        })?;
        let table_len = u64::from(num_properties) * 8 + 8;
        if table_len > u64::from(size) {
            return Err(HpsfError::malformed(format!(
                "Section of {size} bytes cannot hold {num_properties} properties"
            )));
        }
        let table_len = table_len as usize;
        let size = size as usize;

        // Read property identifiers and offsets
        let mut table: Vec<(u32, usize)> = Vec::with_capacity(num_properties as usize);
        for _ in 0..num_properties {
            let id = rdu32le(&mut reader)?;
            let offset = rdu32le(&mut reader)?;
            table.push((id, offset as usize));
        }

        // Each property extends up to the next one (or to the end of the section)
        let mut bounds: Vec<usize> = table.iter().map(|(_, offset)| *offset).collect();
        bounds.push(size);
        bounds.sort_unstable();
        bounds.dedup();
        let end_of = |start: usize| {
            bounds
                .iter()
                .copied()
                .find(|b| *b > start)
                .unwrap_or(size)
        };

        let mut anomalies = Vec::new();

        // Find and read the codepage for this section or fallback to the default
        let mut maybe_cp: Option<CodePage> = None;
        let mut cp_iter = table.iter().filter(|(id, _)| *id == PID_CODEPAGE);
        if let Some((_, cp_offset)) = cp_iter.next() {
            match Property::decode(
                section,
                *cp_offset,
                PID_CODEPAGE,
                options.default_codepage,
                &CodecOptions::strict(),
                &mut Vec::new(),
            ) {
                Ok(Property {
                    value: Variant::I2(CODEPAGE_UNSET),
                    ..
                }) => {}
                Ok(Property {
                    value: Variant::I2(cp),
                    ..
                }) => maybe_cp = Some(cp as u16),
                Ok(p) => anomalies.push(format!(
                    "CodePage property has type 0x{:04x} instead of VT_I2",
                    p.vt()
                )),
                Err(e) => anomalies.push(format!("Invalid CodePage property: {e}")),
            }
        }
        if cp_iter.next().is_some() {
            anomalies.push("Multiple CodePage properties, only the first is used".to_string());
        }
        let codepage = maybe_cp.unwrap_or(options.default_codepage);

        // Read the property values with the correct codepage now in place
        let mut properties = BTreeMap::new();
        let mut dictionary: Option<Dictionary> = None;
        for (id, offset) in table {
            if offset < table_len || offset >= size {
                tolerate(
                    options,
                    &mut anomalies,
                    id,
                    HpsfError::malformed(format!("offset {offset} is out of bounds")),
                )?;
                continue;
            }
            if properties.contains_key(&id) || (id == PID_DICTIONARY && dictionary.is_some()) {
                anomalies.push(format!("Duplicate property 0x{id:08x} ignored"));
                continue;
            }
            let body = &section[..end_of(offset)];
            if id == PID_DICTIONARY {
                match Dictionary::read(body, offset, codepage) {
                    Ok((dict, _)) => dictionary = Some(dict),
                    Err(e) => tolerate(options, &mut anomalies, id, e)?,
                }
            } else {
                match Property::decode(body, offset, id, codepage, options, &mut anomalies) {
                    Ok(p) => {
                        properties.insert(id, p);
                    }
                    Err(e) => tolerate(options, &mut anomalies, id, e)?,
                }
            }
        }

        Ok(Self {
            format_id: Some(format_id),
            properties,
            dictionary,
            declared_size: Some(size as u32),
            anomalies,
        })
    }

    /// The section format identifier
    pub fn format_id(&self) -> Option<ClassId> {
        self.format_id
    }

    /// Sets the section format identifier
    pub fn set_format_id(&mut self, format_id: ClassId) {
        self.format_id = Some(format_id);
    }

    /// Number of properties, the dictionary included
    pub fn property_count(&self) -> usize {
        self.properties.len() + usize::from(self.dictionary.is_some())
    }

    /// Iterates over the properties in id order (the dictionary excluded)
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Returns a property
    pub fn property(&self, id: u32) -> Option<&Property> {
        self.properties.get(&id)
    }

    /// Returns the value of a property
    pub fn value(&self, id: u32) -> Option<&Variant> {
        self.properties.get(&id).map(|p| &p.value)
    }

    /// Adds or replaces a property
    ///
    /// Property 0 is reserved for the dictionary, see [`Section::set_dictionary`].
    pub fn set_property(&mut self, property: Property) -> Option<Property> {
        self.properties.insert(property.id, property)
    }

    /// Sets the value of a property
    ///
    /// If the property exists and holds a string, the new string keeps the existing
    /// string type.
    pub fn set_value<V: Into<Variant>>(&mut self, id: u32, value: V) -> Option<Property> {
        let mut value = value.into();
        if let Some(existing) = self.properties.get(&id) {
            value = match (&existing.value, value) {
                (Variant::LPWStr(_), Variant::LPStr(s) | Variant::BStr(s)) => Variant::LPWStr(s),
                (Variant::BStr(_), Variant::LPStr(s) | Variant::LPWStr(s)) => Variant::BStr(s),
                (Variant::LPStr(_), Variant::LPWStr(s) | Variant::BStr(s)) => Variant::LPStr(s),
                (_, v) => v,
            };
        }
        self.set_property(Property { id, value })
    }

    /// Removes a property
    pub fn remove_property(&mut self, id: u32) -> Option<Property> {
        self.properties.remove(&id)
    }

    /// Removes all the properties and the dictionary
    pub fn clear(&mut self) {
        self.properties.clear();
        self.dictionary = None;
    }

    /// Returns the property named `name` in the dictionary
    pub fn property_by_name(&self, name: &str) -> Option<&Property> {
        let id = self.dictionary.as_ref()?.id_of(name)?;
        self.property(id)
    }

    /// The codepage announced by the CodePage property, if any
    ///
    /// A CodePage of -1 stands for the default and yields `None`.
    pub fn codepage(&self) -> Option<CodePage> {
        match self.value(PID_CODEPAGE)? {
            Variant::I2(CODEPAGE_UNSET) => None,
            Variant::I2(cp) => Some(*cp as u16),
            other => other.as_i64().and_then(|cp| u16::try_from(cp).ok()),
        }
    }

    /// Sets the CodePage property
    pub fn set_codepage(&mut self, codepage: CodePage) {
        self.set_property(Property::new(PID_CODEPAGE, Variant::I2(codepage as i16)));
    }

    /// The dictionary
    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.dictionary.as_ref()
    }

    /// The dictionary, mutably
    pub fn dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        self.dictionary.as_mut()
    }

    /// Sets (or removes) the dictionary
    pub fn set_dictionary(&mut self, dictionary: Option<Dictionary>) {
        self.dictionary = dictionary;
    }

    /// Returns the dictionary, creating an empty one if needed
    pub(crate) fn dictionary_or_default(&mut self) -> &mut Dictionary {
        self.dictionary.get_or_insert_with(Dictionary::new)
    }

    /// Returns a human readable name for a property
    ///
    /// Dictionary names come first, then the well-known names of the format.
    pub fn pid_name(&self, id: u32) -> Option<&str> {
        if let Some(name) = self.dictionary.as_ref().and_then(|d| d.get(id)) {
            return Some(name);
        }
        match self.format_id {
            Some(ClassId::SUMMARY_INFORMATION) => summary_name(id),
            Some(ClassId::DOC_SUMMARY_INFORMATION) => doc_summary_name(id),
            _ => reserved_name(id),
        }
    }

    /// The value of an integer property
    pub fn int_value(&self, id: u32) -> Option<i64> {
        self.value(id)?.as_i64()
    }

    /// The value of a `VT_BOOL` property
    pub fn bool_value(&self, id: u32) -> Option<bool> {
        self.value(id)?.as_bool()
    }

    /// The value of a string property
    pub fn string_value(&self, id: u32) -> Option<&str> {
        self.value(id)?.as_str()
    }

    /// The section size as stored in the parsed data
    pub fn declared_size(&self) -> Option<u32> {
        self.declared_size
    }

    /// Problems tolerated while parsing
    pub fn anomalies(&self) -> &[String] {
        &self.anomalies
    }

    /// The first id available for a new property
    ///
    /// Ids above the highest one in use are preferred; once the top of the range is
    /// taken the lowest gap is used. Ids from 0x80000000 on are reserved.
    pub(crate) fn next_free_id(&self) -> Option<u32> {
        let used: BTreeSet<u32> = self
            .properties
            .keys()
            .copied()
            .chain(self.dictionary.iter().flat_map(|d| d.iter().map(|(id, _)| id)))
            .filter(|id| (PID_CODEPAGE + 1..PID_LOCALE).contains(id))
            .collect();
        match used.last() {
            None => Some(PID_CODEPAGE + 1),
            Some(last) if last + 1 < PID_LOCALE => Some(last + 1),
            Some(_) => (PID_CODEPAGE + 1..PID_LOCALE)
                .zip(used.iter())
                .find(|(id, used)| id != *used)
                .map(|(id, _)| id),
        }
    }

    /// The codepage strings are written in
    fn effective_codepage(&self) -> CodePage {
        match self.codepage() {
            Some(cp) => cp,
            None if self.dictionary.is_some() => CP_UNICODE,
            None => DEFAULT_CODEPAGE,
        }
    }

    /// Serializes each property body, in id order
    fn encode_bodies(&self) -> Result<Vec<(u32, Vec<u8>)>, HpsfError> {
        if self.properties.contains_key(&PID_DICTIONARY) {
            return Err(HpsfError::UnsupportedWriteVariant(
                "property 0 is reserved for the dictionary".to_string(),
            ));
        }
        let codepage = self.effective_codepage();
        // A dictionary needs an explicit codepage
        let explicit_codepage = self.dictionary.is_some() && self.codepage().is_none();
        let mut bodies = Vec::with_capacity(self.properties.len() + 2);
        if let Some(dict) = &self.dictionary {
            let mut body = Vec::new();
            dict.write(&mut body, codepage)?;
            bodies.push((PID_DICTIONARY, body));
            if explicit_codepage {
                let mut body = Vec::new();
                Variant::I2(codepage as i16).write(&mut body, codepage)?;
                bodies.push((PID_CODEPAGE, body));
            }
        }
        for p in self
            .properties
            .values()
            .filter(|p| !(explicit_codepage && p.id == PID_CODEPAGE))
        {
            let mut body = Vec::new();
            p.write(&mut body, codepage)?;
            bodies.push((p.id, body));
        }
        Ok(bodies)
    }

    /// The size in bytes of the serialized section
    pub fn size(&self) -> Result<usize, HpsfError> {
        let bodies = self.encode_bodies()?;
        Ok(8 + bodies.len() * 8 + bodies.iter().map(|(_, b)| b.len()).sum::<usize>())
    }

    /// Serializes the section
    ///
    /// Fails with [`HpsfError::MissingFormatId`] if the format identifier is unset.
    pub fn to_bytes(&self) -> Result<Vec<u8>, HpsfError> {
        if self.format_id.is_none() {
            return Err(HpsfError::MissingFormatId);
        }
        // First pass: sizes
        let bodies = self.encode_bodies()?;
        let table_len = 8 + bodies.len() * 8;
        let size = table_len + bodies.iter().map(|(_, b)| b.len()).sum::<usize>();
        let too_large = || HpsfError::UnsupportedWriteVariant(format!("section of {size} bytes"));
        let size32 = u32::try_from(size).map_err(|_| too_large())?;

        // Second pass: table and bodies
        let mut out = Vec::with_capacity(size);
        wru32le(&mut out, size32)?;
        wru32le(&mut out, bodies.len() as u32)?;
        let mut offset = table_len;
        for (id, body) in &bodies {
            wru32le(&mut out, *id)?;
            wru32le(&mut out, u32::try_from(offset).map_err(|_| too_large())?)?;
            offset += body.len();
        }
        for (_, body) in &bodies {
            out.extend_from_slice(body);
        }
        Ok(out)
    }

    /// Writes the section, returns the number of bytes written
    ///
    /// Nothing is written on failure.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<usize, HpsfError> {
        let data = self.to_bytes()?;
        writer.write_all(&data)?;
        Ok(data.len())
    }
}

/// Sections are equal if they have the same format identifier, the same properties
/// (the codepage excluded) and the same dictionary
impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        fn significant(s: &Section) -> impl Iterator<Item = &Property> {
            s.properties
                .values()
                .filter(|p| p.id != PID_DICTIONARY && p.id != PID_CODEPAGE)
        }
        fn dictionary(s: &Section) -> Option<&Dictionary> {
            s.dictionary.as_ref().filter(|d| !d.is_empty())
        }
        self.format_id == other.format_id
            && significant(self).eq(significant(other))
            && dictionary(self) == dictionary(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::vt;

    fn sample() -> Section {
        let mut s = Section::new(ClassId::SUMMARY_INFORMATION);
        s.set_codepage(1252);
        s.set_value(PIDSI_TITLE, "Titel");
        s.set_value(PIDSI_PAGECOUNT, 3i32);
        s
    }

    #[test]
    fn write_parse() -> Result<(), HpsfError> {
        let s = sample();
        let data = s.to_bytes()?;
        assert_eq!(data.len(), s.size()?);
        // 8 + 3 * 8 + 8 + 16 + 8
        assert_eq!(data.len(), 64);
        assert_eq!(&data[..8], &[64, 0, 0, 0, 3, 0, 0, 0]);
        // Ids in order, first body right after the table
        assert_eq!(&data[8..16], &[1, 0, 0, 0, 32, 0, 0, 0]);

        let parsed = Section::parse(&data, 0, ClassId::SUMMARY_INFORMATION, &CodecOptions::default())?;
        assert_eq!(parsed, s);
        assert_eq!(parsed.declared_size(), Some(64));
        assert_eq!(parsed.codepage(), Some(1252));
        assert_eq!(parsed.string_value(PIDSI_TITLE), Some("Titel"));
        assert_eq!(parsed.int_value(PIDSI_PAGECOUNT), Some(3));
        assert_eq!(parsed.pid_name(PIDSI_TITLE), Some("PID_TITLE"));
        assert!(parsed.anomalies().is_empty());
        Ok(())
    }

    #[test]
    fn missing_format_id() {
        let mut s = Section::default();
        s.set_value(PIDSI_TITLE, "x");
        let mut out = Vec::new();
        assert!(matches!(s.write(&mut out), Err(HpsfError::MissingFormatId)));
        assert!(out.is_empty());
    }

    #[test]
    fn set_value_keeps_string_type() {
        let mut s = Section::new(ClassId::SUMMARY_INFORMATION);
        s.set_property(Property::new(PIDSI_TITLE, Variant::LPWStr("a".into())));
        s.set_value(PIDSI_TITLE, "b");
        assert_eq!(s.value(PIDSI_TITLE), Some(&Variant::LPWStr("b".into())));
        s.set_value(PIDSI_TITLE, 5i32);
        assert_eq!(s.value(PIDSI_TITLE), Some(&Variant::I4(5)));
        assert!(s.remove_property(PIDSI_TITLE).is_some());
        assert!(s.property(PIDSI_TITLE).is_none());
    }

    #[test]
    fn unset_codepage() -> Result<(), HpsfError> {
        let mut s = Section::new(ClassId::SUMMARY_INFORMATION);
        s.set_property(Property::new(PID_CODEPAGE, Variant::I2(CODEPAGE_UNSET)));
        s.set_value(PIDSI_TITLE, "Grüße");
        assert_eq!(s.codepage(), None);
        let data = s.to_bytes()?;

        let parsed = Section::parse(&data, 0, ClassId::SUMMARY_INFORMATION, &CodecOptions::default())?;
        assert!(parsed.anomalies().is_empty());
        assert_eq!(parsed.codepage(), None);
        assert_eq!(parsed.string_value(PIDSI_TITLE), Some("Grüße"));
        assert_eq!(parsed.value(PID_CODEPAGE), Some(&Variant::I2(CODEPAGE_UNSET)));

        // With a dictionary the unset CodePage gives way to an explicit one
        s.dictionary_or_default().insert(2, "Title");
        let parsed = Section::parse(
            &s.to_bytes()?,
            0,
            ClassId::SUMMARY_INFORMATION,
            &CodecOptions::default(),
        )?;
        assert!(parsed.anomalies().is_empty());
        assert_eq!(parsed.codepage(), Some(CP_UNICODE));
        assert_eq!(parsed.string_value(PIDSI_TITLE), Some("Grüße"));
        Ok(())
    }

    #[test]
    fn dictionary_codepage() -> Result<(), HpsfError> {
        let mut s = Section::new(ClassId::USER_DEFINED_PROPERTIES);
        s.dictionary_or_default().insert(2, "Name");
        s.set_value(2, "value");
        let data = s.to_bytes()?;
        let parsed = Section::parse(
            &data,
            0,
            ClassId::USER_DEFINED_PROPERTIES,
            &CodecOptions::default(),
        )?;
        assert_eq!(parsed.codepage(), Some(CP_UNICODE));
        assert_eq!(parsed.property_count(), 3);
        assert_eq!(
            parsed.property_by_name("Name").map(|p| &p.value),
            Some(&Variant::LPStr("value".into()))
        );
        assert!(parsed.property_by_name("Other").is_none());
        assert_eq!(parsed.pid_name(2), Some("Name"));
        assert_eq!(parsed, s);

        // Only Unicode dictionaries can be written
        s.set_codepage(1252);
        assert!(matches!(
            s.to_bytes(),
            Err(HpsfError::UnsupportedWriteVariant(_))
        ));
        Ok(())
    }

    #[test]
    fn next_free_id() {
        let mut s = Section::new(ClassId::USER_DEFINED_PROPERTIES);
        assert_eq!(s.next_free_id(), Some(2));
        s.set_codepage(CP_UNICODE);
        s.set_property(Property::new(PID_LOCALE, 0x0809u32));
        assert_eq!(s.next_free_id(), Some(2));
        s.dictionary_or_default().insert(7, "seven");
        assert_eq!(s.next_free_id(), Some(8));

        // The top of the range is taken
        s.set_property(Property::new(PID_LOCALE - 1, 1i32));
        s.set_property(Property::new(2, 1i32));
        assert_eq!(s.next_free_id(), Some(3));
    }

    #[rustfmt::skip]
    const BROKEN: &[u8] = &[
        0x40, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        0x02, 0x00, 0x00, 0x00, 0x28, 0x00, 0x00, 0x00, // LPSTR, length too large
        0x03, 0x00, 0x00, 0x00, 0x34, 0x00, 0x00, 0x00, // VT_ARRAY
        0x03, 0x00, 0x00, 0x00, 0x38, 0x00, 0x00, 0x00, // duplicate
        0x04, 0x00, 0x00, 0x00, 0x90, 0x00, 0x00, 0x00, // out of bounds
        0x1e, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00,
        b'a', 0x00, 0x00, 0x00,
        0x10, 0x20, 0x00, 0x00,
        0x03, 0x00, 0x00, 0x00, 0x2a, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn tolerant_parse() -> Result<(), HpsfError> {
        let s = Section::parse(BROKEN, 0, ClassId::NULL, &CodecOptions::default())?;
        assert_eq!(s.property_count(), 2);
        assert_eq!(
            s.value(2),
            Some(&Variant::Unsupported {
                vt: vt::LPSTR,
                data: vec![0x40, 0x00, 0x00, 0x00, b'a', 0x00, 0x00, 0x00]
            })
        );
        // Bounded by the next offset
        assert_eq!(
            s.value(3),
            Some(&Variant::Unsupported {
                vt: vt::ARRAY | vt::I1,
                data: Vec::new()
            })
        );
        assert_eq!(s.anomalies().len(), 4);

        // Written back verbatim
        let again = Section::parse(&s.to_bytes()?, 0, ClassId::NULL, &CodecOptions::default())?;
        assert_eq!(again, s);
        Ok(())
    }

    #[test]
    fn strict_parse() {
        assert!(matches!(
            Section::parse(BROKEN, 0, ClassId::NULL, &CodecOptions::strict()),
            Err(HpsfError::MalformedPropertyData(_))
        ));
        let mut truncated = BROKEN.to_vec();
        truncated.truncate(0x30);
        assert!(matches!(
            Section::parse(&truncated, 0, ClassId::NULL, &CodecOptions::default()),
            Err(HpsfError::MalformedPropertyData(_))
        ));
        // Table larger than the section
        let data = [0x10, 0, 0, 0, 0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            Section::parse(&data, 0, ClassId::NULL, &CodecOptions::default()),
            Err(HpsfError::MalformedPropertyData(_))
        ));
    }
}
