//! Remote endpoint models.

use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::domain::attributes::{Attributes, DynamicAttributes, DynamicValue};
use crate::url::EndpointUrl;

/// Well-known attribute names.
pub mod attr {
    /// Declared weight (static).
    pub const WEIGHT: &str = "weight";
    /// Epoch millis at which the endpoint started (static).
    pub const START_TIME: &str = "startTime";
    /// Length of the warmup window in millis (static, consumed by warmup).
    pub const WARMUP_TIME: &str = "warmupTime";
    /// Weight used during the warmup window (static input, dynamic output).
    pub const WARMUP_WEIGHT: &str = "warmupWeight";
    /// Epoch millis at which warmup ends (dynamic).
    pub const WARMUP_END_TIME: &str = "warmupEndTimeMillis";
    /// Traffic gate flag (static).
    pub const UP: &str = "up";
}

/// Lifecycle status of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EndpointStatus {
    /// Inside the warmup window, serving with the warmup weight.
    WarmingUp,
    /// Serving with the declared weight.
    Available,
}

/// A single remote service instance.
///
/// Endpoints are replaced, never patched: every registry sync builds new ones and the
/// identity (`protocol`, `host`, `port`) has no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    protocol: String,
    host: String,
    port: u16,
    path: String,
    static_attrs: Attributes,
    dynamic_attrs: DynamicAttributes,
    declared_weight: u32,
}

impl Endpoint {
    /// Materialize an endpoint from a decoded registry URL.
    ///
    /// Static attributes are the URL parameters verbatim. A missing or unparseable
    /// `weight` falls back to `default_weight`.
    pub fn from_url(url: &EndpointUrl, default_weight: u32) -> Self {
        let declared_weight = url
            .parameter(attr::WEIGHT)
            .and_then(|weight| weight.trim().parse::<u32>().ok())
            .unwrap_or(default_weight);

        Self {
            protocol: url.protocol().to_string(),
            host: url.host().to_string(),
            port: url.port(),
            path: url.path().to_string(),
            static_attrs: url.parameters().clone(),
            dynamic_attrs: DynamicAttributes::default(),
            declared_weight,
        }
    }

    /// Protocol scheme.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Host name or address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Service path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `host:port`, for diagnostics.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Weight declared by the registry, before warmup.
    pub fn declared_weight(&self) -> u32 {
        self.declared_weight
    }

    /// All static attributes.
    pub fn static_attrs(&self) -> &Attributes {
        &self.static_attrs
    }

    /// One static attribute.
    pub fn static_attr(&self, key: &str) -> Option<&str> {
        self.static_attrs.get(key)
    }

    /// All dynamic attributes.
    pub fn dynamic_attrs(&self) -> &DynamicAttributes {
        &self.dynamic_attrs
    }

    /// One dynamic attribute.
    pub fn dynamic_attr(&self, key: &str) -> Option<&DynamicValue> {
        self.dynamic_attrs.get(key)
    }

    /// Attribute lookup preferring the dynamic value.
    pub fn attr(&self, key: &str) -> Option<String> {
        self.dynamic_attrs
            .get(key)
            .map(ToString::to_string)
            .or_else(|| self.static_attrs.get(key).map(str::to_string))
    }

    /// Set a derived attribute. Identity and static attributes stay untouched.
    pub fn with_dynamic_attr(mut self, key: impl Into<String>, value: DynamicValue) -> Self {
        self.dynamic_attrs.insert(key, value);
        self
    }

    pub(crate) fn static_attrs_mut(&mut self) -> &mut Attributes {
        &mut self.static_attrs
    }

    pub(crate) fn dynamic_attrs_mut(&mut self) -> &mut DynamicAttributes {
        &mut self.dynamic_attrs
    }

    fn warming_up_weight(&self, now_ms: u64) -> Option<u32> {
        let end = self.dynamic_attrs.get_int(attr::WARMUP_END_TIME)?;
        let weight = self.dynamic_attrs.get_int(attr::WARMUP_WEIGHT)?;
        if (now_ms as i128) < end as i128 {
            Some(weight.clamp(0, u32::MAX as i64) as u32)
        } else {
            None
        }
    }

    /// Status as of `now_ms` (epoch millis).
    pub fn status_at(&self, now_ms: u64) -> EndpointStatus {
        match self.warming_up_weight(now_ms) {
            Some(_) => EndpointStatus::WarmingUp,
            None => EndpointStatus::Available,
        }
    }

    /// Effective weight as of `now_ms` (epoch millis).
    pub fn weight_at(&self, now_ms: u64) -> u32 {
        self.warming_up_weight(now_ms)
            .unwrap_or(self.declared_weight)
    }

    /// Status against the system clock. Re-evaluated on every call.
    pub fn status(&self) -> EndpointStatus {
        self.status_at(SystemClock.now_millis())
    }

    /// Effective weight against the system clock. Re-evaluated on every call.
    pub fn weight(&self) -> u32 {
        self.weight_at(SystemClock.now_millis())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// A thread-safe reference to an Endpoint.
pub type SharedEndpoint = Arc<Endpoint>;
