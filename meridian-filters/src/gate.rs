//! Traffic gate.
//!
//! Providers register closed. Traffic only reaches the ones an operator has explicitly
//! opened with `up=1`; if none is open the call fails instead of falling back to the
//! closed ones.

use std::sync::Arc;

use meridian_core::domain::endpoint::attr;
use meridian_core::throttle::LogThrottle;
use meridian_core::{ConsumerConfig, EndpointList, SharedEndpoint};

use crate::chain::{RouteRequest, Router, RouterRegistration};
use crate::error::{RouteResult, RoutingBlockedError};
use crate::switch::ForceCloseSwitch;

/// Router name.
pub const TRAFFIC_GATE_NAME: &str = "upFilter";
/// Position in the chain; runs ahead of ordinary routers.
pub const TRAFFIC_GATE_ORDER: i32 = -16_000;
/// Value of the `up` attribute marking an endpoint open.
pub const UP_VALUE: &str = "1";

/// Filters the endpoint list down to endpoints whose traffic flag is open.
#[derive(Debug, Clone, Default)]
pub struct TrafficGate {
    switch: ForceCloseSwitch,
    throttle: Option<Arc<LogThrottle>>,
}

impl TrafficGate {
    /// A gate controlled by `switch`.
    pub fn new(switch: ForceCloseSwitch) -> Self {
        Self {
            switch,
            throttle: None,
        }
    }

    /// Throttle the error logged for blocked calls.
    pub fn with_throttle(mut self, throttle: Arc<LogThrottle>) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// The gate only guards registry-subscribed consumers; direct connections skip it.
    pub fn is_active_for(consumer: &ConsumerConfig) -> bool {
        !consumer.is_direct() && consumer.subscribe
    }

    /// Registration at [`TRAFFIC_GATE_ORDER`] with the gate's activation predicate.
    pub fn registration(self) -> RouterRegistration {
        RouterRegistration::new(TRAFFIC_GATE_ORDER, Arc::new(self), Self::is_active_for)
    }

    fn is_open(endpoint: &SharedEndpoint) -> bool {
        endpoint.attr(attr::UP).as_deref() == Some(UP_VALUE)
    }

    fn report(&self, error: &RoutingBlockedError) {
        let log = || tracing::error!(interface = %error.interface, "{error}");
        match &self.throttle {
            Some(throttle) => {
                throttle.run(log);
            }
            None => log(),
        }
    }
}

impl Router for TrafficGate {
    fn name(&self) -> &str {
        TRAFFIC_GATE_NAME
    }

    fn route(
        &self,
        request: &RouteRequest<'_>,
        endpoints: EndpointList,
    ) -> RouteResult<EndpointList> {
        if self.switch.is_enabled() || endpoints.is_empty() {
            return Ok(endpoints);
        }

        let open: Vec<SharedEndpoint> = endpoints
            .iter()
            .filter(|endpoint| Self::is_open(endpoint))
            .cloned()
            .collect();

        if open.is_empty() {
            let error = RoutingBlockedError {
                interface: request.interface_name().to_string(),
            };
            self.report(&error);
            return Err(error.into());
        }
        if open.len() == endpoints.len() {
            return Ok(endpoints);
        }
        Ok(open.into())
    }
}
