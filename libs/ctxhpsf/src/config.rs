//! Facilities for reading codec options
use crate::codepage::{self, CodePage};
use crate::error::HpsfError;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How a recoverable decoding problem is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Keep going: the offending item is replaced by a placeholder and an anomaly is recorded
    Tolerate,
    /// Abort with an error
    Fail,
}

/// Codec options
///
/// All the fields have defaults, so an empty (or missing) configuration is valid.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecOptions {
    /// What to do with variant types which are defined but not handled
    pub unsupported_variant: Policy,

    /// What to do when a single property cannot be decoded
    pub malformed_property: Policy,

    /// What to do when a whole section cannot be decoded
    pub malformed_section: Policy,

    /// Log tolerated unsupported types at `warn` level (instead of `debug`)
    pub log_unsupported: bool,

    /// The codepage used by sections lacking a CodePage property
    pub default_codepage: CodePage,

    /// Maximum size in bytes of a property set stream
    pub max_stream_size: u64,
}

// From MS-OLEPS 2.21
// An implementation SHOULD enforce a limit on the total size of a PropertySetStream packet. This limit
// MUST be at least 262,144 bytes, and for maximum interoperability SHOULD be 2,097,152 bytes.
const PSS_MIN_MAX_LEN: u64 = 262_144;
const PSS_REC_MAX_LEN: u64 = 2_097_152;

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            unsupported_variant: Policy::Tolerate,
            malformed_property: Policy::Tolerate,
            malformed_section: Policy::Fail,
            log_unsupported: false,
            default_codepage: codepage::DEFAULT_CODEPAGE,
            max_stream_size: PSS_REC_MAX_LEN,
        }
    }
}

impl CodecOptions {
    /// Options which refuse anything the codec cannot fully decode
    pub fn strict() -> Self {
        Self {
            unsupported_variant: Policy::Fail,
            malformed_property: Policy::Fail,
            malformed_section: Policy::Fail,
            ..Self::default()
        }
    }

    /// Constructs `CodecOptions` from `hpsf.toml` and `HPSF__` prefixed environment variables
    pub fn load() -> Result<Self, HpsfError> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("hpsf.toml"))
                .merge(Env::prefixed("HPSF__").split("__")),
        )
    }

    /// Constructs `CodecOptions` from an arbitrary figment and validates the values
    pub fn from_figment(figment: Figment) -> Result<Self, HpsfError> {
        let config: Self = figment.extract()?;

        macro_rules! disallow_value_below {
            ($parent:ident.$var:ident, $limit:expr) => {
                if $parent.$var < $limit {
                    Err(HpsfError::ConfigParameterValue {
                        parameter: stringify!($var),
                        message: format!(
                            "parameter value should be equal or larger than {}",
                            $limit
                        ),
                    })?
                }
            };
        }
        disallow_value_below!(config.max_stream_size, PSS_MIN_MAX_LEN);

        macro_rules! disallow_value_above {
            ($parent:ident.$var:ident, $limit:expr) => {
                if $parent.$var > $limit as _ {
                    Err(HpsfError::ConfigParameterValue {
                        parameter: stringify!($var),
                        message: format!("parameter value should be equal or less than {}", $limit),
                    })?
                }
            };
        }
        disallow_value_above!(config.max_stream_size, u64::from(u32::MAX));

        if !codepage::is_supported(config.default_codepage) {
            Err(HpsfError::ConfigParameterValue {
                parameter: "default_codepage",
                message: format!("codepage {} is not supported", config.default_codepage),
            })?
        }

        trace!("final config: {config:#?}");

        Ok(config)
    }
}
