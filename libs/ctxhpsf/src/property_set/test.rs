use super::*;
use crate::codepage::CP_UNICODE;
use crate::property_ids::*;
use crate::variant::{vt, Currency, Decimal, Filetime, Variant, Vector};
use time::macros::datetime;

const SUMMARY: &[u8] = &[
    0xFE, 0xFF, 0x00, 0x00, 0x06, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0xE0, 0x85,
    0x9F, 0xF2, 0xF9, 0x4F, 0x68, 0x10, 0xAB, 0x91, 0x08, 0x00, 0x2B, 0x27, 0xB3, 0xD9, 0x30,
    0x00, 0x00, 0x00, 0x8C, 0x01, 0x00, 0x00, 0x12, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
    0x98, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0xA0, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00,
    0x00, 0xB8, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0xC4, 0x00, 0x00, 0x00, 0x05, 0x00,
    0x00, 0x00, 0xD0, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0xDC, 0x00, 0x00, 0x00, 0x07,
    0x00, 0x00, 0x00, 0xE8, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0xFC, 0x00, 0x00, 0x00,
    0x09, 0x00, 0x00, 0x00, 0x10, 0x01, 0x00, 0x00, 0x12, 0x00, 0x00, 0x00, 0x1C, 0x01, 0x00,
    0x00, 0x0A, 0x00, 0x00, 0x00, 0x3C, 0x01, 0x00, 0x00, 0x0B, 0x00, 0x00, 0x00, 0x48, 0x01,
    0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x54, 0x01, 0x00, 0x00, 0x0D, 0x00, 0x00, 0x00, 0x60,
    0x01, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00, 0x6C, 0x01, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x00,
    0x74, 0x01, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x7C, 0x01, 0x00, 0x00, 0x13, 0x00, 0x00,
    0x00, 0x84, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0xE4, 0x04, 0x00, 0x00, 0x1E, 0x00,
    0x00, 0x00, 0x0F, 0x00, 0x00, 0x00, 0x4A, 0x6F, 0x65, 0x27, 0x73, 0x20, 0x64, 0x6F, 0x63,
    0x75, 0x6D, 0x65, 0x6E, 0x74, 0x00, 0x00, 0x1E, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
    0x4A, 0x6F, 0x62, 0x00, 0x1E, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x4A, 0x6F, 0x65,
    0x00, 0x1E, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1E, 0x00,
    0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1E, 0x00, 0x00, 0x00, 0x0C,
    0x00, 0x00, 0x00, 0x4E, 0x6F, 0x72, 0x6D, 0x61, 0x6C, 0x2E, 0x64, 0x6F, 0x74, 0x6D, 0x00,
    0x1E, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x43, 0x6F, 0x72, 0x6E, 0x65, 0x6C, 0x69,
    0x75, 0x73, 0x00, 0x00, 0x00, 0x1E, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x36, 0x36,
    0x00, 0x00, 0x1E, 0x00, 0x00, 0x00, 0x18, 0x00, 0x00, 0x00, 0x4D, 0x69, 0x63, 0x72, 0x6F,
    0x73, 0x6F, 0x66, 0x74, 0x20, 0x4F, 0x66, 0x66, 0x69, 0x63, 0x65, 0x20, 0x57, 0x6F, 0x72,
    0x64, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x00, 0x6E, 0xD9, 0xA2, 0x42, 0x00, 0x00,
    0x00, 0x40, 0x00, 0x00, 0x00, 0x00, 0x16, 0xD0, 0xA1, 0x4E, 0x8E, 0xC6, 0x01, 0x40, 0x00,
    0x00, 0x00, 0x00, 0x1C, 0xF2, 0xD5, 0x2A, 0xCE, 0xC6, 0x01, 0x40, 0x00, 0x00, 0x00, 0x00,
    0x3C, 0xDC, 0x73, 0xDD, 0x80, 0xC8, 0x01, 0x03, 0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00,
    0x03, 0x00, 0x00, 0x00, 0xE5, 0x0D, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x38, 0x4F, 0x00,
    0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const GENERIC: &[u8] = &[
    0xFE, 0xFF, 0x01, 0x00, 0x06, 0x00, 0x02, 0x00, 0x53, 0xFF, 0x4B, 0x99, 0xF9, 0xDD, 0xAD,
    0x42, 0xA5, 0x6A, 0xFF, 0xEA, 0x36, 0x17, 0xAC, 0x16, 0x01, 0x00, 0x00, 0x00, 0x01, 0x18,
    0x00, 0x20, 0xE6, 0x5D, 0xD1, 0x11, 0x8E, 0x38, 0x00, 0xC0, 0x4F, 0xB9, 0x38, 0x6D, 0x30,
    0x00, 0x00, 0x00, 0xDC, 0x01, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
    0x58, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x60, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
    0x80, 0x68, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x70, 0x00, 0x00, 0x00, 0x04, 0x00,
    0x00, 0x00, 0x38, 0x01, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x4C, 0x01, 0x00, 0x00, 0x07,
    0x00, 0x00, 0x00, 0x70, 0x01, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x7C, 0x01, 0x00, 0x00,
    0x27, 0x00, 0x00, 0x00, 0x94, 0x01, 0x00, 0x00, 0x92, 0x00, 0x00, 0x00, 0xC0, 0x01, 0x00,
    0x00, 0x02, 0x00, 0x00, 0x00, 0xB0, 0x04, 0x00, 0x00, 0x13, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x09, 0x08, 0x13, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x04,
    0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00, 0x44, 0x00, 0x69, 0x00, 0x73, 0x00, 0x70, 0x00,
    0x6C, 0x00, 0x61, 0x00, 0x79, 0x00, 0x43, 0x00, 0x6F, 0x00, 0x6C, 0x00, 0x6F, 0x00, 0x75,
    0x00, 0x72, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x4D, 0x00,
    0x79, 0x00, 0x53, 0x00, 0x74, 0x00, 0x72, 0x00, 0x65, 0x00, 0x61, 0x00, 0x6D, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x0B, 0x00, 0x00, 0x00, 0x50, 0x00, 0x72, 0x00,
    0x69, 0x00, 0x63, 0x00, 0x65, 0x00, 0x28, 0x00, 0x47, 0x00, 0x42, 0x00, 0x50, 0x00, 0x29,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x4D, 0x00,
    0x79, 0x00, 0x53, 0x00, 0x74, 0x00, 0x6F, 0x00, 0x72, 0x00, 0x61, 0x00, 0x67, 0x00, 0x65,
    0x00, 0x00, 0x00, 0x27, 0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00, 0x43, 0x00, 0x61, 0x00,
    0x73, 0x00, 0x65, 0x00, 0x53, 0x00, 0x65, 0x00, 0x6E, 0x00, 0x73, 0x00, 0x69, 0x00, 0x74,
    0x00, 0x69, 0x00, 0x76, 0x00, 0x65, 0x00, 0x00, 0x00, 0x92, 0x00, 0x00, 0x00, 0x0E, 0x00,
    0x00, 0x00, 0x43, 0x00, 0x41, 0x00, 0x53, 0x00, 0x45, 0x00, 0x53, 0x00, 0x45, 0x00, 0x4E,
    0x00, 0x53, 0x00, 0x49, 0x00, 0x54, 0x00, 0x49, 0x00, 0x56, 0x00, 0x45, 0x00, 0x00, 0x00,
    0x08, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x47, 0x00, 0x72, 0x00, 0x65, 0x00, 0x79,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x49, 0x00, 0x00, 0x00, 0xCA, 0x84, 0x95, 0xF9, 0x23, 0xCA,
    0x0B, 0x47, 0x83, 0x94, 0x22, 0x01, 0x77, 0x90, 0x7A, 0xAD, 0x0C, 0x00, 0x00, 0x00, 0x70,
    0x00, 0x72, 0x00, 0x6F, 0x00, 0x70, 0x00, 0x36, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00,
    0x00, 0x50, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x45, 0x00, 0x00, 0x00, 0x0E, 0x00, 0x00,
    0x00, 0x70, 0x00, 0x72, 0x00, 0x6F, 0x00, 0x70, 0x00, 0x31, 0x00, 0x32, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x10, 0x20, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03,
    0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x03, 0xF8, 0x14, 0x17, 0x12, 0x87, 0x45, 0x29, 0x25, 0x11, 0x33, 0x56, 0x79, 0xA2, 0x9C,
    0x00, 0x0C, 0x10, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x11, 0x00, 0x00, 0x00, 0xA9, 0x00,
    0x00, 0x00, 0x14, 0x00, 0x00, 0x00, 0xA9, 0x00, 0x76, 0x99, 0x3B, 0x22, 0x10, 0x9C,
];

#[rustfmt::skip]
const TYPES: [u8; 0x15c] = [
    /* 0x0000 */ 0xfe,0xff, // byte order
    /* 0x0002 */ 0x00,0x00, // format
    /* 0x0004 */ 0x06,0x00,0x02,0x00, // os version
    /* 0x0008 */ 0xf0,0xe1,0xd2,0xc3,0xb4,0xa5,0x86,0x87, // class id
    /* 0x0010 */ 0x78,0x69,0x5a,0x4b,0x3c,0x2d,0x1e,0x0f,
    /* 0x0018 */ 0x01,0x00,0x00,0x00, // section count
    /* 0x001c */ 0xe0,0x85,0x9f,0xf2,0xf9,0x4f,0x68,0x10, // format id
    /* 0x0024 */ 0xab,0x91,0x08,0x00,0x2b,0x27,0xb3,0xd9,
    /* 0x002c */ 0x30,0x00,0x00,0x00, // section offset
    /* 0x0030 */ 0x2c,0x01,0x00,0x00, // section size
    /* 0x0034 */ 0x0f,0x00,0x00,0x00, // property count
    /* 0x0038 */ 0x00,0x00,0x37,0x13,0x80,0x00,0x00,0x00, // id 0x13370000
    /* 0x0040 */ 0x01,0x00,0x00,0x00,0x88,0x00,0x00,0x00, // codepage
    /* 0x0048 */ 0x01,0x00,0x37,0x13,0x90,0x00,0x00,0x00, // id 0x13370001
    /* 0x0050 */ 0x02,0x00,0x37,0x13,0x98,0x00,0x00,0x00, // id 0x13370002
    /* 0x0058 */ 0x03,0x00,0x37,0x13,0xa0,0x00,0x00,0x00, // id 0x13370003
    /* 0x0060 */ 0x04,0x00,0x37,0x13,0xa8,0x00,0x00,0x00, // id 0x13370004
    /* 0x0068 */ 0x05,0x00,0x37,0x13,0xbc,0x00,0x00,0x00, // id 0x13370005
    /* 0x0070 */ 0x06,0x00,0x37,0x13,0xc8,0x00,0x00,0x00, // id 0x13370006
    /* 0x0078 */ 0x07,0x00,0x37,0x13,0xd8,0x00,0x00,0x00, // id 0x13370007
    /* 0x0080 */ 0x08,0x00,0x37,0x13,0xe0,0x00,0x00,0x00, // id 0x13370008
    /* 0x0088 */ 0x09,0x00,0x37,0x13,0xf0,0x00,0x00,0x00, // id 0x13370009
    /* 0x0090 */ 0x0a,0x00,0x37,0x13,0xf8,0x00,0x00,0x00, // id 0x1337000a
    /* 0x0098 */ 0x0b,0x00,0x37,0x13,0x00,0x01,0x00,0x00, // id 0x1337000b
    /* 0x00a0 */ 0x0c,0x00,0x37,0x13,0x0c,0x01,0x00,0x00, // id 0x1337000c
    /* 0x00a8 */ 0x0d,0x00,0x37,0x13,0x20,0x01,0x00,0x00, // id 0x1337000d
    /* 0x00b0 */ 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // VT_EMPTY
    /* 0x00b8 */ 0x02,0x00,0x00,0x00,0x52,0x03,0x00,0x00, // VT_I2 850
    /* 0x00c0 */ 0x03,0x00,0x00,0x00,0xab,0xac,0x37,0x13, // VT_I4 0x1337acab
    /* 0x00c8 */ 0x04,0x00,0x00,0x00,0xc3,0xf5,0x48,0x40, // VT_R4 3.14
    /* 0x00d0 */ 0x11,0x00,0x00,0x00,0xa5,0x00,0x00,0x00, // VT_UI1 0xa5
    /* 0x00d8 */ 0x0e,0x00,0x00,0x00,0x00,0x00,0x0a,0x80, // VT_DECIMAL -9876543210.0123456789
    /* 0x00e0 */ 0x05,0x00,0x00,0x00,0x15,0x35,0xd2,0x9f,
    /* 0x00e8 */ 0x36,0x4d,0xa5,0x5a,
    /* 0x00ec */ 0x15,0x00,0x00,0x00,0x0d,0xd0,0x37,0x13, // VT_UI8 0xdeadbeef1337d00d
    /* 0x00f4 */ 0xef,0xbe,0xad,0xde,
    /* 0x00f8 */ 0x1e,0x00,0x00,0x00,0x07,0x00,0x00,0x00, // VT_LPSTR "ABC123"
    /* 0x0100 */ 0x41,0x42,0x43,0x31,0x32,0x33,0x00,0x00,
    /* 0x0108 */ 0x01,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // VT_NULL
    /* 0x0110 */ 0x1f,0x00,0x00,0x00,0x04,0x00,0x00,0x00, // VT_LPWSTR "←⏭➘"
    /* 0x0118 */ 0x90,0x21,0xed,0x23,0x98,0x27,0x00,0x00,
    /* 0x0120 */ 0x0b,0x00,0x00,0x00,0x01,0x00,0x00,0x00, // VT_BOOL true
    /* 0x0128 */ 0x0b,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // VT_BOOL false
    /* 0x0130 */ 0x40,0x00,0x00,0x00,0x80,0x80,0xf4,0xed, // VT_FILETIME 2021-01-02T03:04:05
    /* 0x0138 */ 0xb3,0xe0,0xd6,0x01,
    /* 0x013c */ 0x41,0x00,0x00,0x00,0x09,0x00,0x00,0x00, // VT_BLOB [1..=9]
    /* 0x0144 */ 0x01,0x02,0x03,0x04,0x05,0x06,0x07,0x08,
    /* 0x014c */ 0x09,0x0a,0x00,0x00,
    /* 0x0150 */ 0x06,0x00,0x00,0x00,0x00,0xe4,0x0b,0x54, // VT_CY 1000000
    /* 0x0158 */ 0x02,0x00,0x00,0x00,
];

#[test]
fn summary_information() -> Result<(), HpsfError> {
    let ps = PropertySet::parse(SUMMARY)?;
    assert_eq!(ps.byte_order(), BYTE_ORDER_ASSERTION);
    assert_eq!(ps.format(), FORMAT_ASSERTION);
    assert_eq!(ps.os_version(), 0x00020006);
    assert!(ps.class_id().is_null());
    assert_eq!(ps.section_count(), 1);
    assert!(ps.is_summary_information());
    assert!(!ps.is_document_summary_information());
    assert!(ps.anomalies().is_empty());

    let section = ps.single_section()?;
    assert_eq!(section.format_id(), Some(ClassId::SUMMARY_INFORMATION));
    assert_eq!(section.declared_size(), Some(0x18c));
    assert_eq!(section.property_count(), 18);
    assert_eq!(section.codepage(), Some(1252));
    assert_eq!(
        section.value(PIDSI_TITLE),
        Some(&Variant::LPStr("Joe's document".to_string()))
    );
    assert_eq!(section.pid_name(PIDSI_TITLE), Some("PID_TITLE"));
    assert_eq!(section.string_value(PIDSI_SUBJECT), Some("Job"));
    assert_eq!(section.string_value(PIDSI_AUTHOR), Some("Joe"));
    assert_eq!(section.string_value(PIDSI_KEYWORDS), Some(""));
    assert_eq!(section.string_value(PIDSI_COMMENTS), Some(""));
    assert_eq!(section.string_value(PIDSI_TEMPLATE), Some("Normal.dotm"));
    assert_eq!(section.string_value(PIDSI_LASTAUTHOR), Some("Cornelius"));
    assert_eq!(section.string_value(PIDSI_REVNUMBER), Some("66"));
    assert_eq!(section.string_value(PIDSI_APPNAME), Some("Microsoft Office Word"));

    let edit_time = section.value(PIDSI_EDITTIME).and_then(|v| v.as_filetime());
    assert_eq!(edit_time, Some(Filetime::new(286_200_000_000)));
    assert_eq!(
        edit_time.and_then(|ft| ft.as_duration()),
        Some(time::Duration::seconds((7 * 60 + 57) * 60))
    );
    assert_eq!(
        ps.datetime_value(PIDSI_LASTPRINTED),
        Some(datetime!(2006-06-12 18:33 UTC))
    );
    assert_eq!(
        ps.datetime_value(PIDSI_CREATE_DTM),
        Some(datetime!(2006-09-02 0:58 UTC))
    );
    assert_eq!(
        ps.datetime_value(PIDSI_LASTSAVE_DTM),
        Some(datetime!(2008-03-08 5:30 UTC))
    );
    assert_eq!(ps.int_value(PIDSI_PAGECOUNT), 14);
    assert_eq!(ps.int_value(PIDSI_WORDCOUNT), 3557);
    assert_eq!(ps.int_value(PIDSI_CHARCOUNT), 20_280);
    assert_eq!(ps.int_value(PIDSI_SECURITY), 0);
    assert!(!ps.was_null());
    Ok(())
}

#[test]
fn generic_with_dictionary() -> Result<(), HpsfError> {
    let ps = PropertySet::parse(GENERIC)?;
    assert_eq!(ps.format(), FORMAT_VERSION_1);
    assert_eq!(ps.os_version(), 0x00020006);
    assert_eq!(
        ps.class_id().to_string(),
        "994BFF53-DDF9-42AD-A56A-FFEA3617AC16"
    );
    assert!(!ps.is_summary_information());
    assert!(!ps.is_document_summary_information());

    let section = ps.single_section()?;
    assert_eq!(
        section.format_id().map(|id| id.to_string()),
        Some("20001801-5DE6-11D1-8E38-00C04FB9386D".to_string())
    );
    assert_eq!(section.declared_size(), Some(0x1dc));
    assert_eq!(section.property_count(), 10);
    assert_eq!(section.codepage(), Some(CP_UNICODE));
    assert_eq!(section.value(PID_LOCALE), Some(&Variant::UI4(0x08090000)));
    assert_eq!(section.value(0x80000001), Some(&Variant::UI4(1)));

    let dictionary = section.dictionary().expect("dictionary expected");
    assert_eq!(
        dictionary.iter().collect::<Vec<_>>(),
        [
            (4, "DisplayColour"),
            (6, "MyStream"),
            (7, "Price(GBP)"),
            (12, "MyStorage"),
            (39, "CaseSensitive"),
            (146, "CASESENSITIVE"),
        ]
    );
    assert!(dictionary.is_pure(section));
    assert_eq!(section.pid_name(7), Some("Price(GBP)"));
    assert_eq!(
        section.property_by_name("DisplayColour").map(|p| &p.value),
        Some(&Variant::BStr("Grey".to_string()))
    );
    assert_eq!(
        section.value(7),
        Some(&Variant::CY(Currency { value: 1_331_200 }))
    );

    // Streams, storages and arrays are kept undecoded
    for (id, tag, len) in [(6, 0x0049, 32), (12, 0x0045, 20), (39, vt::ARRAY | vt::I1, 40)] {
        match section.value(id) {
            Some(Variant::Unsupported { vt, data }) => {
                assert_eq!(*vt, tag);
                assert_eq!(data.len(), len);
            }
            other => panic!("Unexpected value for {id}: {other:?}"),
        }
    }
    assert_eq!(ps.anomalies().len(), 3);

    assert_eq!(
        section.value(146),
        Some(&Variant::Vector(Vector::new(
            vt::VARIANT,
            vec![Variant::UI1(169), Variant::I8(-7201218164792360791)]
        )))
    );
    Ok(())
}

#[test]
#[allow(clippy::approx_constant)]
fn variant_types() -> Result<(), HpsfError> {
    let ps = PropertySet::parse(&TYPES)?;
    assert_eq!(ps.format(), FORMAT_ASSERTION);
    assert_eq!(
        ps.class_id().to_string(),
        "C3D2E1F0-A5B4-8786-7869-5A4B3C2D1E0F"
    );
    let section = ps.single_section()?;
    assert_eq!(section.property_count(), 15);
    assert_eq!(section.codepage(), Some(850));

    let value = |n: u32| section.value(0x1337_0000 + n);
    assert_eq!(value(0), Some(&Variant::Empty));
    assert_eq!(value(1), Some(&Variant::I4(0x1337acab)));
    assert_eq!(value(2), Some(&Variant::R4(3.14)));
    assert_eq!(value(3), Some(&Variant::UI1(0xa5)));
    assert_eq!(
        value(4),
        Some(&Variant::Decimal(Decimal {
            value: -98765432100123456789,
            scale: 10
        }))
    );
    assert_eq!(value(5), Some(&Variant::UI8(0xdeadbeef1337d00d)));
    // Codepage 850 has no decoder: the string is kept as is
    assert_eq!(
        value(6),
        Some(&Variant::Unsupported {
            vt: vt::LPSTR,
            data: vec![7, 0, 0, 0, b'A', b'B', b'C', b'1', b'2', b'3', 0, 0],
        })
    );
    assert_eq!(value(7), Some(&Variant::Null));
    assert_eq!(value(8), Some(&Variant::LPWStr("←⏭➘".to_string())));
    assert_eq!(value(9), Some(&Variant::Bool(true)));
    assert_eq!(value(10), Some(&Variant::Bool(false)));
    assert_eq!(
        value(11)
            .and_then(|v| v.as_filetime())
            .and_then(|ft| ft.as_datetime()),
        Some(datetime!(2021-01-02 3:04:05 UTC))
    );
    assert_eq!(value(12), Some(&Variant::Blob(vec![1, 2, 3, 4, 5, 6, 7, 8, 9])));
    assert_eq!(
        value(13),
        Some(&Variant::CY(Currency {
            value: 10_000_000_000
        }))
    );
    assert!(ps.anomalies().iter().any(|a| a.contains("0x13370006")));

    assert!(matches!(
        PropertySet::parse_with(&TYPES, &CodecOptions::strict()),
        Err(HpsfError::UnsupportedEncodingForCodepage(850))
    ));
    Ok(())
}

#[test]
fn strict_rejects_unsupported_types() {
    assert!(matches!(
        PropertySet::parse_with(GENERIC, &CodecOptions::strict()),
        Err(HpsfError::UnsupportedVariantType(0x49))
    ));
}

#[test]
fn rewrite() -> Result<(), HpsfError> {
    for data in [SUMMARY, GENERIC, &TYPES[..]] {
        let ps = PropertySet::parse(data)?;
        let mut out = Vec::new();
        let written = ps.write(&mut out)?;
        assert_eq!(written, out.len());
        assert_eq!(out, ps.to_bytes()?);

        let reparsed = PropertySet::parse(&out)?;
        assert_eq!(reparsed, ps);
        let section = reparsed.single_section()?;
        assert_eq!(
            section.declared_size().map(|s| s as usize),
            Some(out.len() - HEADER_LEN - SECTION_ENTRY_LEN)
        );
        assert_eq!(reparsed.to_bytes()?, out);
    }
    Ok(())
}

#[test]
fn modified_property_set_differs() -> Result<(), HpsfError> {
    let original = PropertySet::parse(SUMMARY)?;
    let mut ps = original.clone();
    assert_eq!(ps, original);
    if let Some(section) = ps.first_section_mut() {
        section.set_value(PIDSI_TITLE, "Joe's other document");
    }
    assert_ne!(ps, original);
    let mut ps = original.clone();
    ps.set_os_version(DEFAULT_OS_VERSION);
    assert_ne!(ps, original);
    Ok(())
}

#[test]
fn not_a_property_set() {
    let mut bad_order = SUMMARY.to_vec();
    bad_order.swap(0, 1);
    let mut bad_format = SUMMARY.to_vec();
    bad_format[2] = 2;
    let mut no_sections = SUMMARY.to_vec();
    no_sections[24] = 0;
    let mut three_sections = SUMMARY.to_vec();
    three_sections[24] = 3;

    assert!(PropertySet::is_property_set_stream(SUMMARY));
    assert!(PropertySet::is_property_set_stream(GENERIC));
    let candidates: [&[u8]; 7] = [
        &[],
        b"This is not a property set stream at all, really",
        &SUMMARY[..47],
        &bad_order,
        &bad_format,
        &no_sections,
        &three_sections,
    ];
    for data in candidates {
        assert!(!PropertySet::is_property_set_stream(data));
        assert!(matches!(
            PropertySet::parse(data),
            Err(HpsfError::NotAPropertySetStream(_))
        ));
    }
}

#[test]
fn missing_format_id() {
    let ps = PropertySet::new();
    assert_eq!(ps.section_count(), 1);
    let mut out = Vec::new();
    assert!(matches!(ps.write(&mut out), Err(HpsfError::MissingFormatId)));
    assert!(out.is_empty());
}

#[test]
fn malformed_section() -> Result<(), HpsfError> {
    let ps = PropertySet::with_sections(vec![
        Section::new(ClassId::DOC_SUMMARY_INFORMATION),
        Section::new(ClassId::USER_DEFINED_PROPERTIES),
    ]);
    let mut data = ps.to_bytes()?;
    assert_eq!(PropertySet::parse(&data)?.section_count(), 2);

    // Point the second section past the end of the stream
    let entry = HEADER_LEN + SECTION_ENTRY_LEN + ClassId::LENGTH;
    data[entry..entry + 4].copy_from_slice(&0xffffu32.to_le_bytes());
    assert!(matches!(
        PropertySet::parse(&data),
        Err(HpsfError::MalformedPropertyData(_))
    ));

    let options = CodecOptions {
        malformed_section: Policy::Tolerate,
        ..CodecOptions::default()
    };
    let ps = PropertySet::parse_with(&data, &options)?;
    assert_eq!(ps.section_count(), 1);
    assert!(ps.is_document_summary_information());
    assert_eq!(ps.anomalies().len(), 1);
    Ok(())
}

#[test]
fn oversized_stream() {
    let options = CodecOptions {
        max_stream_size: 100,
        ..CodecOptions::default()
    };
    assert!(matches!(
        PropertySet::parse_with(SUMMARY, &options),
        Err(HpsfError::MalformedPropertyData(_))
    ));
}

#[test]
fn sections() -> Result<(), HpsfError> {
    let mut ps = PropertySet::parse(SUMMARY)?;
    ps.add_section(Section::new(ClassId::USER_DEFINED_PROPERTIES));
    assert_eq!(ps.section_count(), 2);
    assert!(matches!(
        ps.single_section(),
        Err(HpsfError::WrongPropertySetKind(_))
    ));
    assert!(ps.remove_section(5).is_none());
    let removed = ps.remove_section(1).expect("section expected");
    assert_eq!(removed.format_id(), Some(ClassId::USER_DEFINED_PROPERTIES));
    assert!(ps.single_section().is_ok());

    ps.add_section(Section::new(ClassId::USER_DEFINED_PROPERTIES));
    ps.add_section(Section::new(ClassId::USER_DEFINED_PROPERTIES));
    assert_eq!(ps.section_count(), 3);
    assert!(matches!(
        ps.to_bytes(),
        Err(HpsfError::UnsupportedWriteVariant(_))
    ));

    ps.clear_sections();
    assert!(matches!(
        ps.to_bytes(),
        Err(HpsfError::UnsupportedWriteVariant(_))
    ));
    let mut out = Vec::new();
    assert!(ps.write(&mut out).is_err());
    assert!(out.is_empty());
    assert!(ps.first_section().is_none());
    assert!(!ps.is_summary_information());
    assert_eq!(ps.int_value(PIDSI_PAGECOUNT), 0);
    assert!(ps.was_null());
    Ok(())
}

#[test]
fn was_null() -> Result<(), HpsfError> {
    let ps = PropertySet::parse(SUMMARY)?;
    assert_eq!(ps.int_value(PIDSI_SECURITY), 0);
    assert!(!ps.was_null());
    assert_eq!(ps.int_value(PIDSI_THUMBNAIL), 0);
    assert!(ps.was_null());
    assert_eq!(ps.string_value(PIDSI_AUTHOR), Some("Joe"));
    assert!(!ps.was_null());
    // Wrong type
    assert!(!ps.bool_value(PIDSI_AUTHOR));
    assert!(ps.was_null());
    assert!(ps.datetime_value(PIDSI_PAGECOUNT).is_none());
    assert!(ps.was_null());
    Ok(())
}

#[test]
fn kinds() -> Result<(), HpsfError> {
    let options = CodecOptions::default();
    match PropertySetKind::from_bytes(SUMMARY, &options)? {
        PropertySetKind::Summary(si) => assert_eq!(si.title(), Some("Joe's document")),
        other => panic!("Unexpected kind {}", other.name()),
    }

    let kind = PropertySetKind::from_bytes(GENERIC, &options)?;
    assert_eq!(kind.name(), "PropertySet");
    assert_eq!(kind.property_set().format(), FORMAT_VERSION_1);

    let data = DocumentSummaryInformation::new().property_set().to_bytes()?;
    let kind = PropertySetKind::from_bytes(&data, &options)?;
    assert_eq!(kind.name(), "DocumentSummaryInformation");
    assert!(matches!(kind, PropertySetKind::DocumentSummary(_)));
    Ok(())
}
