//! Ordered router chains.
//!
//! Each consumer builds its chain once from a set of [`RouterRegistration`]s: the
//! activation predicates are evaluated against the consumer configuration, the survivors
//! are sorted by `order` (lower runs first) and the result is fixed for the lifetime of
//! the consumer. Every call then folds the current endpoint list through the chain.

use std::fmt;
use std::sync::Arc;

use meridian_core::{ConsumerConfig, EndpointList};

use crate::error::RouteResult;

/// The call being routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequest<'a> {
    interface_name: &'a str,
    method_name: Option<&'a str>,
}

impl<'a> RouteRequest<'a> {
    /// A request against `interface_name`.
    pub fn new(interface_name: &'a str) -> Self {
        Self {
            interface_name,
            method_name: None,
        }
    }

    /// Attach the invoked method.
    pub fn with_method(mut self, method_name: &'a str) -> Self {
        self.method_name = Some(method_name);
        self
    }

    /// Target interface.
    pub fn interface_name(&self) -> &'a str {
        self.interface_name
    }

    /// Invoked method, if known.
    pub fn method_name(&self) -> Option<&'a str> {
        self.method_name
    }
}

/// One filter stage.
///
/// Implementations must not assume exclusive ownership of the list they receive: the
/// same `Arc` is shared with the published snapshot and with concurrent calls. Return it
/// as-is to pass through, or build a new list to shrink or reorder.
pub trait Router: Send + Sync {
    /// Stable name used in logs and errors.
    fn name(&self) -> &str;

    /// Filter `endpoints` for `request`.
    fn route(&self, request: &RouteRequest<'_>, endpoints: EndpointList)
        -> RouteResult<EndpointList>;
}

/// Decides at consumer setup whether a router joins the chain.
pub type Activation = Arc<dyn Fn(&ConsumerConfig) -> bool + Send + Sync>;

/// A router together with its position and activation predicate.
#[derive(Clone)]
pub struct RouterRegistration {
    order: i32,
    activation: Activation,
    router: Arc<dyn Router>,
}

impl fmt::Debug for RouterRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterRegistration")
            .field("name", &self.router.name())
            .field("order", &self.order)
            .finish()
    }
}

impl RouterRegistration {
    /// Register `router` at `order`, active only for consumers matching `activation`.
    pub fn new<F>(order: i32, router: Arc<dyn Router>, activation: F) -> Self
    where
        F: Fn(&ConsumerConfig) -> bool + Send + Sync + 'static,
    {
        Self {
            order,
            activation: Arc::new(activation),
            router,
        }
    }

    /// Register `router` at `order` for every consumer.
    pub fn always(order: i32, router: Arc<dyn Router>) -> Self {
        Self::new(order, router, |_| true)
    }

    /// Position in the chain.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Name of the registered router.
    pub fn name(&self) -> &str {
        self.router.name()
    }

    /// Evaluate the activation predicate.
    pub fn is_active_for(&self, consumer: &ConsumerConfig) -> bool {
        (self.activation)(consumer)
    }
}

/// The resolved, ordered routers of one consumer.
#[derive(Clone, Default)]
pub struct RouterChain {
    routers: Vec<Arc<dyn Router>>,
}

impl fmt::Debug for RouterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl RouterChain {
    /// Resolve the chain for `consumer`.
    ///
    /// Routers sharing an `order` keep their registration order.
    pub fn build<I>(registrations: I, consumer: &ConsumerConfig) -> Self
    where
        I: IntoIterator<Item = RouterRegistration>,
    {
        let mut active: Vec<RouterRegistration> = registrations
            .into_iter()
            .filter(|registration| registration.is_active_for(consumer))
            .collect();
        active.sort_by_key(RouterRegistration::order);

        let chain = Self {
            routers: active.into_iter().map(|r| r.router).collect(),
        };
        tracing::debug!(
            interface = %consumer.interface_id,
            routers = ?chain.names(),
            "router chain resolved"
        );
        chain
    }

    /// Names of the active routers, in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.routers.iter().map(|r| r.name()).collect()
    }

    /// Number of active routers.
    pub fn len(&self) -> usize {
        self.routers.len()
    }

    /// True when no router is active.
    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Run every router in order, each consuming the previous output.
    pub fn route(
        &self,
        request: &RouteRequest<'_>,
        endpoints: EndpointList,
    ) -> RouteResult<EndpointList> {
        self.routers.iter().try_fold(endpoints, |endpoints, router| {
            let before = endpoints.len();
            let routed = router.route(request, endpoints)?;
            tracing::trace!(
                router = router.name(),
                interface = request.interface_name(),
                before,
                after = routed.len(),
                "router applied"
            );
            Ok(routed)
        })
    }
}
