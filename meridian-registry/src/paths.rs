//! Registry path layout.
//!
//! Every interface owns one subtree under `<root><namespace>/<interface>` with four
//! children: `providers`, `configurators`, `overrides` and `config`. Child node names are
//! form-encoded URLs or plain attribute keys.

use meridian_core::error::DecodeResult;
use meridian_core::url::encode_component;
use meridian_core::{DiscoveryConfig, EndpointUrl, RegistryDecodeError};

const PROVIDERS: &str = "providers";
const CONFIGURATORS: &str = "configurators";
const OVERRIDES: &str = "overrides";
const CONFIG: &str = "config";

/// The registry subtree of one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePaths {
    service: String,
}

impl ServicePaths {
    /// Paths for `interface_id` under `root` (ending in `/`) and `namespace`.
    pub fn new(root: &str, namespace: &str, interface_id: &str) -> Self {
        Self {
            service: format!("{root}{namespace}/{interface_id}"),
        }
    }

    /// Paths for `interface_id` using the configured root and namespace.
    pub fn from_config(config: &DiscoveryConfig, interface_id: &str) -> Self {
        Self::new(&config.root_path, &config.namespace, interface_id)
    }

    /// The interface subtree itself.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Endpoint nodes.
    pub fn providers(&self) -> String {
        format!("{}/{PROVIDERS}", self.service)
    }

    /// Address-keyed configurator nodes.
    pub fn configurators(&self) -> String {
        format!("{}/{CONFIGURATORS}", self.service)
    }

    /// Consumer-local override nodes.
    pub fn overrides(&self) -> String {
        format!("{}/{OVERRIDES}", self.service)
    }

    /// Plain attribute nodes.
    pub fn config(&self) -> String {
        format!("{}/{CONFIG}", self.service)
    }
}

/// The configurators subtree that sits next to `providers_path`.
pub fn configurator_path_for(providers_path: &str) -> DecodeResult<String> {
    match providers_path.rsplit_once('/') {
        Some((parent, _)) => Ok(format!("{parent}/{CONFIGURATORS}")),
        None => Err(RegistryDecodeError::InvalidPath {
            path: providers_path.to_string(),
        }),
    }
}

/// The child segment of `entry_path` below `base`, still encoded.
pub fn entry_suffix<'a>(base: &str, entry_path: &'a str) -> DecodeResult<&'a str> {
    entry_path
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| RegistryDecodeError::PathOutsideBase {
            base: base.to_string(),
            path: entry_path.to_string(),
        })
}

/// The node path registering `url` under `base`.
pub fn child_path(base: &str, url: &EndpointUrl) -> String {
    format!("{base}/{}", encode_component(&url.to_full_string()))
}
