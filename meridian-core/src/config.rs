//! Configuration definitions for discovery and for the consumers/providers it serves.
//!
//! All structs deserialize from TOML with serde defaults, so a minimal document only
//! names what it changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigAccessorError, ConfigError};

/// Declared weight used when an endpoint does not carry a valid `weight`.
pub const DEFAULT_WEIGHT: u32 = 100;

/// Process-wide discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Weight applied to endpoints without a parseable `weight` parameter.
    pub default_weight: u32,
    /// Registry root, always ending in `/`.
    pub root_path: String,
    /// Namespace segment under the root that holds every interface.
    pub namespace: String,
    /// Address of this process, used to pick consumer-local overrides.
    pub local_host: Option<String>,
    /// Minimum gap between two identical throttled diagnostics.
    pub log_wait_millis: u64,
    /// Log every diagnostic, ignoring `log_wait_millis`.
    pub disable_throttled_logs: bool,
    /// Fallback values restored when a config-subtree attribute is removed.
    pub defaults: BTreeMap<String, String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_weight: DEFAULT_WEIGHT,
            root_path: "/".to_string(),
            namespace: "meridian-rpc".to_string(),
            local_host: None,
            log_wait_millis: 1_000,
            disable_throttled_logs: false,
            defaults: BTreeMap::new(),
        }
    }
}

impl DiscoveryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would produce malformed registry paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root_path.starts_with('/') || !self.root_path.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "root_path `{}` must start and end with `/`",
                self.root_path
            )));
        }
        if self.namespace.is_empty() || self.namespace.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "namespace `{}` must be a single non-empty path segment",
                self.namespace
            )));
        }
        Ok(())
    }

    /// The configured fallback for a config-subtree attribute.
    pub fn default_value(&self, key: &str) -> Result<&str, ConfigAccessorError> {
        self.defaults
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConfigAccessorError::new("DiscoveryConfig", key))
    }
}

/// Typed, name-addressed read access to a configuration object.
///
/// Used to restore the configured value of a key once a registry override for it is
/// removed.
pub trait PropertyAccessor {
    /// Name of the configuration type, for error messages.
    fn config_type(&self) -> &'static str;

    /// The configured value of `key`, rendered as a string.
    fn property(&self, key: &str) -> Result<String, ConfigAccessorError>;

    /// `Some` when this is a consumer-side configuration.
    fn as_consumer(&self) -> Option<&ConsumerConfig> {
        None
    }
}

/// Settings of one consumer (client) of a remote interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Fully qualified interface name.
    pub interface_id: String,
    /// Fixed address list; when set the registry is not consulted.
    pub direct_url: Option<String>,
    /// Whether to subscribe to registry updates.
    pub subscribe: bool,
    /// Call timeout in milliseconds.
    pub timeout: u64,
    /// Serialization name.
    pub serialization: String,
    /// Load balancer name.
    pub loadbalancer: String,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            interface_id: String::new(),
            direct_url: None,
            subscribe: true,
            timeout: 3_000,
            serialization: "hessian2".to_string(),
            loadbalancer: "random".to_string(),
        }
    }
}

impl ConsumerConfig {
    /// A registry-subscribed consumer for `interface_id` with default settings.
    pub fn new(interface_id: impl Into<String>) -> Self {
        Self {
            interface_id: interface_id.into(),
            ..Self::default()
        }
    }

    /// True when endpoints come from a fixed address rather than the registry.
    pub fn is_direct(&self) -> bool {
        self.direct_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

impl PropertyAccessor for ConsumerConfig {
    fn config_type(&self) -> &'static str {
        "ConsumerConfig"
    }

    fn property(&self, key: &str) -> Result<String, ConfigAccessorError> {
        match key {
            "interface" => Ok(self.interface_id.clone()),
            "subscribe" => Ok(self.subscribe.to_string()),
            "directUrl" => Ok(self.direct_url.clone().unwrap_or_default()),
            "timeout" => Ok(self.timeout.to_string()),
            "serialization" => Ok(self.serialization.clone()),
            "loadbalancer" => Ok(self.loadbalancer.clone()),
            _ => Err(ConfigAccessorError::new(self.config_type(), key)),
        }
    }

    fn as_consumer(&self) -> Option<&ConsumerConfig> {
        Some(self)
    }
}

/// Settings of one provider (server) of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Fully qualified interface name.
    pub interface_id: String,
    /// Server-side timeout in milliseconds.
    pub timeout: u64,
    /// Serialization name.
    pub serialization: String,
    /// Declared weight.
    pub weight: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            interface_id: String::new(),
            timeout: 3_000,
            serialization: "hessian2".to_string(),
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl PropertyAccessor for ProviderConfig {
    fn config_type(&self) -> &'static str {
        "ProviderConfig"
    }

    fn property(&self, key: &str) -> Result<String, ConfigAccessorError> {
        match key {
            "interface" => Ok(self.interface_id.clone()),
            "timeout" => Ok(self.timeout.to_string()),
            "serialization" => Ok(self.serialization.clone()),
            "weight" => Ok(self.weight.to_string()),
            _ => Err(ConfigAccessorError::new(self.config_type(), key)),
        }
    }
}
