//! Error taxonomy shared by every Meridian crate.

use thiserror::Error;

/// Result alias for registry decoding.
pub type DecodeResult<T> = Result<T, RegistryDecodeError>;

/// Raised while turning raw registry data into endpoints.
///
/// Any of these aborts translation of the whole batch; the previously published
/// snapshot stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryDecodeError {
    /// A `%` was not followed by two hex digits.
    #[error("malformed percent-encoding at byte {position} in `{input}`")]
    MalformedPercentEncoding {
        /// The raw, still encoded input.
        input: String,
        /// Byte offset of the offending `%`.
        position: usize,
    },
    /// The decoded bytes are not valid UTF-8.
    #[error("decoded registry data is not valid UTF-8: `{input}`")]
    InvalidUtf8 {
        /// The raw input.
        input: String,
    },
    /// The URL has no `scheme://` prefix.
    #[error("missing scheme in url `{url}`")]
    MissingScheme {
        /// The decoded URL.
        url: String,
    },
    /// The URL port is not a valid `u16`.
    #[error("invalid port `{port}` in url `{url}`")]
    InvalidPort {
        /// The decoded URL.
        url: String,
        /// The rejected port text.
        port: String,
    },
    /// An entry path does not live under the watched base path.
    #[error("registry path `{path}` is not under `{base}`")]
    PathOutsideBase {
        /// The watched base path.
        base: String,
        /// The child path.
        path: String,
    },
    /// A path has no parent segment to derive siblings from.
    #[error("registry path `{path}` has no parent segment")]
    InvalidPath {
        /// The rejected path.
        path: String,
    },
    /// Warmup attributes are present but `startTime` is not.
    #[error("endpoint {address} declares warmup attributes without a startTime")]
    MissingStartTime {
        /// `host:port` of the endpoint.
        address: String,
    },
    /// A typed attribute could not be parsed.
    #[error("endpoint {address} has invalid {key}=`{value}`")]
    InvalidAttribute {
        /// `host:port` of the endpoint.
        address: String,
        /// Attribute name.
        key: String,
        /// Attribute value.
        value: String,
    },
}

/// The configuration object cannot resolve the requested property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{config_type} has no configured value for `{key}`")]
pub struct ConfigAccessorError {
    /// The configuration type that was asked.
    pub config_type: &'static str,
    /// The property name.
    pub key: String,
}

impl ConfigAccessorError {
    /// Build an accessor error for `key` on `config_type`.
    pub fn new(config_type: &'static str, key: impl Into<String>) -> Self {
        Self {
            config_type,
            key: key.into(),
        }
    }
}

/// Failure loading a [`crate::config::DiscoveryConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document did not deserialize.
    #[error("invalid discovery config: {0}")]
    Toml(#[from] toml::de::Error),
    /// A value deserialized but is out of range.
    #[error("invalid discovery config: {0}")]
    Invalid(String),
}
