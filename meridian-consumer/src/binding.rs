//! Per-consumer routing state.

use std::sync::Arc;

use arc_swap::ArcSwap;
use meridian_core::domain::attributes::Attributes;
use meridian_core::{ConsumerConfig, EndpointList, PropertyAccessor, SharedSnapshotTable};
use meridian_filters::error::RouteResult;
use meridian_filters::{RouteRequest, RouterChain, RouterRegistration};

/// A consumer bound to the published snapshot of its interface.
///
/// The router chain is resolved once here; every call afterwards only loads the current
/// snapshot and folds it through the chain.
#[derive(Debug)]
pub struct ConsumerBinding {
    config: ConsumerConfig,
    table: SharedSnapshotTable,
    chain: RouterChain,
    /// Consumer-local overrides pushed through the registry.
    overrides: ArcSwap<Attributes>,
}

impl ConsumerBinding {
    /// Bind `config` to `table`, resolving the router chain from `registrations`.
    pub fn new<I>(config: ConsumerConfig, registrations: I, table: SharedSnapshotTable) -> Self
    where
        I: IntoIterator<Item = RouterRegistration>,
    {
        let chain = RouterChain::build(registrations, &config);
        Self {
            config,
            table,
            chain,
            overrides: ArcSwap::from_pointee(Attributes::new()),
        }
    }

    /// The consumer configuration.
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// The snapshot table this consumer reads.
    pub fn table(&self) -> &SharedSnapshotTable {
        &self.table
    }

    /// The resolved router chain.
    pub fn chain(&self) -> &RouterChain {
        &self.chain
    }

    /// Filter the current endpoints for a call.
    pub fn route(&self) -> RouteResult<EndpointList> {
        let request = RouteRequest::new(&self.config.interface_id);
        self.chain.route(&request, self.table.endpoints())
    }

    /// Filter the current endpoints for a call to `method`.
    pub fn route_method(&self, method: &str) -> RouteResult<EndpointList> {
        let request = RouteRequest::new(&self.config.interface_id).with_method(method);
        self.chain.route(&request, self.table.endpoints())
    }

    /// Merge override attributes; later values win.
    pub fn apply_override_attributes(&self, attributes: &Attributes) {
        if attributes.is_empty() {
            return;
        }
        self.overrides.rcu(|current| {
            let mut merged = Attributes::clone(current);
            for (key, value) in attributes.iter() {
                merged.insert(key, value);
            }
            merged
        });
        tracing::info!(
            interface = %self.config.interface_id,
            attributes = ?attributes,
            "consumer override applied"
        );
    }

    /// The value in effect for `key`: the pushed override, else the configured value.
    pub fn effective_attribute(&self, key: &str) -> Option<String> {
        if let Some(value) = self.overrides.load().get(key) {
            return Some(value.to_string());
        }
        self.config.property(key).ok()
    }
}

/// A shared reference to a consumer binding.
pub type SharedConsumerBinding = Arc<ConsumerBinding>;

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::{Endpoint, EndpointUrl, SnapshotTable};
    use meridian_filters::{RouteError, TrafficGate};

    fn endpoint(host: &str, up: bool) -> Endpoint {
        let mut url = EndpointUrl::new("bolt", host, 12200);
        if up {
            url = url.with_parameter("up", "1");
        }
        Endpoint::from_url(&url, 100)
    }

    #[test]
    fn routes_against_latest_snapshot() {
        let table = Arc::new(SnapshotTable::new());
        let binding = ConsumerBinding::new(
            ConsumerConfig::new("com.acme.Echo"),
            [TrafficGate::default().registration()],
            Arc::clone(&table),
        );

        assert!(binding.route().unwrap().is_empty());

        table.publish([endpoint("a", false)]);
        assert!(matches!(binding.route(), Err(RouteError::Blocked(_))));

        table.publish([endpoint("a", false), endpoint("b", true)]);
        let routed = binding.route_method("echo").unwrap();
        assert_eq!(routed.len(), 1);
        assert_eq!(routed[0].host(), "b");
    }

    #[test]
    fn overrides_shadow_configured_values() {
        let binding = ConsumerBinding::new(
            ConsumerConfig::new("com.acme.Echo"),
            [],
            Arc::new(SnapshotTable::new()),
        );
        assert_eq!(binding.effective_attribute("timeout").as_deref(), Some("3000"));

        let pushed: Attributes = [("timeout", "200")].into_iter().collect();
        binding.apply_override_attributes(&pushed);
        assert_eq!(binding.effective_attribute("timeout").as_deref(), Some("200"));

        let restored: Attributes = [("timeout", "3000")].into_iter().collect();
        binding.apply_override_attributes(&restored);
        assert_eq!(binding.effective_attribute("timeout").as_deref(), Some("3000"));
        assert_eq!(binding.effective_attribute("unknown"), None);
    }
}
