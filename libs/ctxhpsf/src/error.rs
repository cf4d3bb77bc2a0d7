//! Error type shared by the whole codec
use crate::codepage::CodePage;
use thiserror::Error;

/// Property set codec errors
#[derive(Error, Debug)]
pub enum HpsfError {
    /// The stream does not start with a property set header.
    #[error("not a property set stream: {0}")]
    NotAPropertySetStream(String),

    /// A declared length, offset or tag is inconsistent with the data.
    #[error("malformed property data: {0}")]
    MalformedPropertyData(String),

    /// The variant type is defined by the format but not handled here.
    #[error("unsupported variant type 0x{0:04X}")]
    UnsupportedVariantType(u32),

    /// The codepage has no known text encoding.
    #[error("unsupported encoding for codepage {0}")]
    UnsupportedEncodingForCodepage(CodePage),

    /// The text cannot be represented in the codepage.
    #[error("string cannot be encoded in codepage {0}")]
    Unencodable(CodePage),

    /// A section was written without a format identifier.
    #[error("section has no format ID")]
    MissingFormatId,

    /// The value can be read but not written.
    #[error("unsupported variant for writing: {0}")]
    UnsupportedWriteVariant(String),

    /// A destination buffer is shorter than the structure to write.
    #[error("buffer too small: {needed} bytes needed, {available} available")]
    BufferTooSmall {
        /// Bytes required
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// The property set is not of the expected well-known kind.
    #[error("property set is not a {0}")]
    WrongPropertySetKind(&'static str),

    /// Configuration parameter value is out of bounds.
    #[error("config parameter `{parameter}` value is out of bounds: {message}")]
    ConfigParameterValue {
        /// Parameter name
        parameter: &'static str,
        /// Description of the allowed values
        message: String,
    },

    /// Wrapper for [`Figment::Error`](https://docs.rs/figment/latest/figment/struct.Error.html)
    #[error("config deserialization: {0:?}")]
    ConfigDeserialization(#[from] figment::Error),

    /// Wrapper for [`std::io::Error`](https://doc.rust-lang.org/std/io/struct.Error.html)
    #[error("IO error: {0:?}")]
    Io(std::io::Error),
}

impl HpsfError {
    pub(crate) fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedPropertyData(msg.into())
    }
}

/// Short reads while decoding are a data problem, not an I/O one
impl From<std::io::Error> for HpsfError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData => {
                Self::MalformedPropertyData(e.to_string())
            }
            _ => Self::Io(e),
        }
    }
}
