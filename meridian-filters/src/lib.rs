//! Meridian Router Filters
//!
//! Per-call filtering of a service's endpoint list through an ordered chain of
//! pluggable routers, including the fail-closed traffic gate.

pub mod chain;
pub mod error;
pub mod gate;
pub mod switch;

pub use chain::{Activation, RouteRequest, Router, RouterChain, RouterRegistration};
pub use error::{RouteError, RoutingBlockedError};
pub use gate::TrafficGate;
pub use switch::ForceCloseSwitch;
