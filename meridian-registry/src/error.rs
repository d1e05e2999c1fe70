//! Errors raised while deriving attributes from registry data.

use meridian_core::{ConfigAccessorError, RegistryDecodeError};
use thiserror::Error;

/// Failure deriving one attribute from a registry node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// The node could not be decoded.
    #[error(transparent)]
    Decode(#[from] RegistryDecodeError),
    /// The fallback value for a removed attribute is not configured.
    #[error(transparent)]
    Accessor(#[from] ConfigAccessorError),
}
