//! Win32 structs and fns: GUIDs and FILETIME conversions
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

/// A Win32 GUID
#[derive(PartialEq, Eq, Clone, Copy, Default)]
pub struct GUID {
    data1: u32,
    data2: u16,
    data3: u16,
    data4: [u8; 8],
}

impl GUID {
    /// Creates a GUID from its 16 byte on-disk (mixed endian) layout
    pub fn from_le_bytes(bytes: &[u8; 16]) -> Self {
        let [a, b, c, d, e, f, g, h, data4 @ ..] = *bytes;
        Self {
            data1: u32::from_le_bytes([a, b, c, d]),
            data2: u16::from_le_bytes([e, f]),
            data3: u16::from_le_bytes([g, h]),
            data4,
        }
    }

    /// Returns the 16 byte on-disk (mixed endian) layout
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut ret = [0u8; 16];
        ret[0..4].copy_from_slice(&self.data1.to_le_bytes());
        ret[4..6].copy_from_slice(&self.data2.to_le_bytes());
        ret[6..8].copy_from_slice(&self.data3.to_le_bytes());
        ret[8..16].copy_from_slice(&self.data4);
        ret
    }

    /// Check whether the GUID is all zeroes
    pub fn is_null(&self) -> bool {
        *self == Self::default()
    }
}

impl Display for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}-{:04x}-{:04x}-", self.data1, self.data2, self.data3)?;
        for (n, b) in self.data4.iter().enumerate() {
            if n == 2 {
                f.write_str("-")?;
            }
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl Debug for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self)
    }
}

impl FromStr for GUID {
    type Err = ();

    /// Parses the `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form (any case, no braces)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.bytes().all(|b| b == b'-' || b.is_ascii_hexdigit()) {
            return Err(());
        }
        let parts: Vec<&str> = s.split('-').collect();
        let [d1, d2, d3, d4, d5] = parts.as_slice() else {
            return Err(());
        };
        if [d1.len(), d2.len(), d3.len(), d4.len(), d5.len()] != [8, 4, 4, 4, 12] {
            return Err(());
        }
        let hex = |s: &str| u64::from_str_radix(s, 16).map_err(|_| ());
        Ok(Self {
            data1: hex(d1)? as u32,
            data2: hex(d2)? as u16,
            data3: hex(d3)? as u16,
            data4: ((hex(d4)? << 48) | hex(d5)?).to_be_bytes(),
        })
    }
}

/// Number of 100ns intervals between 1601-01-01 and 1970-01-01
const FILETIME_UNIX_EPOCH: i128 = 116444736000000000;

/// Translates a windows FILETIME to a [datetime](time::OffsetDateTime)
///
/// Returns None if the date is out of range
pub fn filetime_to_datetime(ftime: u64) -> Option<time::OffsetDateTime> {
    let ftime = i128::from(ftime);
    let ftime = ftime.checked_sub(FILETIME_UNIX_EPOCH)?;
    time::OffsetDateTime::from_unix_timestamp_nanos(ftime * 100).ok()
}

/// Translates a [datetime](time::OffsetDateTime) to a windows FILETIME
///
/// Sub-100ns precision is truncated
///
/// Returns None if the date precedes 1601-01-01 or does not fit into 64 bits
pub fn datetime_to_filetime(dt: time::OffsetDateTime) -> Option<u64> {
    let ticks = dt.unix_timestamp_nanos().div_euclid(100);
    u64::try_from(ticks.checked_add(FILETIME_UNIX_EPOCH)?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY_INFORMATION: [u8; 16] = [
        0xe0, 0x85, 0x9f, 0xf2, 0xf9, 0x4f, 0x68, 0x10, 0xab, 0x91, 0x08, 0x00, 0x2b, 0x27, 0xb3,
        0xd9,
    ];

    #[test]
    fn guid_layout() {
        let guid = GUID::from_le_bytes(&SUMMARY_INFORMATION);
        assert_eq!(guid.data1, 0xf29f85e0);
        assert_eq!(guid.data2, 0x4ff9);
        assert_eq!(guid.data3, 0x1068);
        assert_eq!(guid.data4, [0xab, 0x91, 0x08, 0x00, 0x2b, 0x27, 0xb3, 0xd9]);
        assert_eq!(guid.to_string(), "f29f85e0-4ff9-1068-ab91-08002b27b3d9");
        assert_eq!(format!("{guid:?}"), "{f29f85e0-4ff9-1068-ab91-08002b27b3d9}");
        assert_eq!(guid.to_le_bytes(), SUMMARY_INFORMATION);
        assert!(!guid.is_null());
        assert!(GUID::from_le_bytes(&[0u8; 16]).is_null());
    }

    #[test]
    fn guid_parse() {
        let guid = GUID::from_le_bytes(&SUMMARY_INFORMATION);
        assert_eq!("F29F85E0-4ff9-1068-AB91-08002b27b3d9".parse(), Ok(guid));
        assert_eq!(
            "00000000-0000-0000-0000-000000000000".parse(),
            Ok(GUID::default())
        );
        for bad in [
            "",
            "f29f85e0-4ff9-1068-ab91-08002b27b3d",
            "f29f85e0-4ff9-1068-ab9108-002b27b3d9",
            "f29f85e0-4ff9 1068-ab91-08002b27b3d9",
            "f29f85e0_4ff9-1068-ab91-08002b27b3d9",
            "f29f85e0-4ff9-1068-ab91-08002b27b3dg",
            "+29f85e0-4ff9-1068-ab91-08002b27b3d9",
            "{f29f85e0-4ff9-1068-ab91-08002b27b3d9}",
        ] {
            assert_eq!(bad.parse::<GUID>(), Err(()), "{bad}");
        }
    }

    #[test]
    fn filetime() {
        let dt = time::OffsetDateTime::new_utc(
            time::Date::from_calendar_date(2021, time::Month::January, 2).unwrap(),
            time::Time::from_hms(3, 4, 5).unwrap(),
        );
        assert_eq!(filetime_to_datetime(0x01d6e0b3edf48080), Some(dt));
        assert_eq!(datetime_to_filetime(dt), Some(0x01d6e0b3edf48080));
        assert_eq!(
            filetime_to_datetime(0).map(|dt| dt.year()),
            Some(1601)
        );
        assert_eq!(
            datetime_to_filetime(time::OffsetDateTime::UNIX_EPOCH),
            Some(116444736000000000)
        );
        let too_early = time::OffsetDateTime::new_utc(
            time::Date::from_calendar_date(1600, time::Month::December, 31).unwrap(),
            time::Time::MIDNIGHT,
        );
        assert_eq!(datetime_to_filetime(too_early), None);
        assert_eq!(filetime_to_datetime(u64::MAX), None);
    }
}
