//! Override resolution.
//!
//! Two kinds of operator-pushed overrides live in the registry:
//!
//! - **configurators**, keyed by endpoint address, whose parameters are merged verbatim
//!   into the matching endpoint URL before it is materialized;
//! - **consumer-local overrides**, keyed by consumer host, of which only a fixed
//!   allow-list of keys is honored. Removing one restores the consumer's configured
//!   value.

use std::collections::HashMap;
use std::fmt;

use meridian_core::domain::attributes::Attributes;
use meridian_core::error::DecodeResult;
use meridian_core::url::decode_component;
use meridian_core::{EndpointUrl, PropertyAccessor};

use crate::entry::{ChangeKind, RegistryEntry};
use crate::paths::{configurator_path_for, entry_suffix};

/// Parameters pushed for one endpoint address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    address_key: String,
    parameters: Attributes,
}

impl OverrideEntry {
    /// Build an entry from a decoded configurator URL.
    pub fn from_url(url: &EndpointUrl) -> Self {
        Self {
            address_key: url.address_key(),
            parameters: url.parameters().clone(),
        }
    }

    /// Host and port concatenated as text.
    pub fn address_key(&self) -> &str {
        &self.address_key
    }

    /// Pushed parameters; may be empty.
    pub fn parameters(&self) -> &Attributes {
        &self.parameters
    }
}

/// Configurator overrides by address key.
pub type OverrideMap = HashMap<String, OverrideEntry>;

/// Decode every configurator entry next to `providers_path`.
///
/// A single malformed entry fails the whole batch.
pub fn parse_configurators(
    providers_path: &str,
    entries: &[RegistryEntry],
) -> DecodeResult<OverrideMap> {
    let configurators_path = configurator_path_for(providers_path)?;
    let mut overrides = OverrideMap::with_capacity(entries.len());
    for entry in entries {
        let url = EndpointUrl::decode(entry_suffix(&configurators_path, entry.path())?)?;
        let parsed = OverrideEntry::from_url(&url);
        overrides.insert(parsed.address_key.clone(), parsed);
    }
    Ok(overrides)
}

/// Apply the configurator for `url`'s address, if any. Every pushed parameter wins.
pub fn merge_override(url: &EndpointUrl, overrides: &OverrideMap) -> EndpointUrl {
    match overrides.get(&url.address_key()) {
        Some(entry) => entry
            .parameters
            .iter()
            .fold(url.clone(), |merged, (key, value)| {
                merged.with_parameter(key, value)
            }),
        None => url.clone(),
    }
}

/// Keys a consumer-local override may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverridableKey {
    /// Call timeout.
    Timeout,
    /// Serialization name.
    Serialization,
    /// Load balancer name.
    Loadbalancer,
}

impl OverridableKey {
    /// Every overridable key.
    pub const ALL: [OverridableKey; 3] = [
        OverridableKey::Timeout,
        OverridableKey::Serialization,
        OverridableKey::Loadbalancer,
    ];

    /// The attribute name.
    pub fn as_str(self) -> &'static str {
        match self {
            OverridableKey::Timeout => "timeout",
            OverridableKey::Serialization => "serialization",
            OverridableKey::Loadbalancer => "loadbalancer",
        }
    }

    /// Look up an attribute name in the allow-list.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for OverridableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allow-listed attributes of one consumer-local override node.
///
/// For added or updated nodes the pushed values are returned. For a removed node each
/// pushed key is mapped back to the value `config` carries; keys `config` cannot
/// resolve are logged and skipped.
pub fn override_attribute(
    overrides_path: &str,
    entry: &RegistryEntry,
    change: ChangeKind,
    config: &dyn PropertyAccessor,
) -> DecodeResult<Attributes> {
    let url = EndpointUrl::decode(entry_suffix(overrides_path, entry.path())?)?;
    let mut attributes = Attributes::new();

    for (key, value) in url.parameters().iter() {
        let Some(key) = OverridableKey::parse(key) else {
            continue;
        };
        if change != ChangeKind::Removed {
            attributes.insert(key.as_str(), value);
            continue;
        }
        match config.property(key.as_str()) {
            Ok(configured) => {
                attributes.insert(key.as_str(), configured);
            }
            Err(error) => {
                tracing::warn!(%key, %error, "cannot restore overridden attribute");
            }
        }
    }
    Ok(attributes)
}

/// Whether an override node is aimed at `host`, i.e. its URL contains `://<host>?`.
pub fn targets_host(overrides_path: &str, entry: &RegistryEntry, host: &str) -> DecodeResult<bool> {
    if host.is_empty() {
        return Ok(false);
    }
    let url = decode_component(entry_suffix(overrides_path, entry.path())?)?;
    Ok(url.contains(&format!("://{host}?")))
}

/// Allow-listed attributes of every override node targeting `local_host`.
///
/// Only consumer configurations take consumer-local overrides. Nodes aimed at other
/// hosts are skipped silently.
pub fn local_override_attributes(
    config: &dyn PropertyAccessor,
    overrides_path: &str,
    entries: &[RegistryEntry],
    local_host: &str,
) -> DecodeResult<Vec<Attributes>> {
    if config.as_consumer().is_none() {
        return Ok(Vec::new());
    }

    let mut attributes = Vec::new();
    for entry in entries {
        if !targets_host(overrides_path, entry, local_host)? {
            continue;
        }
        attributes.push(override_attribute(
            overrides_path,
            entry,
            ChangeKind::Added,
            config,
        )?);
    }
    Ok(attributes)
}
