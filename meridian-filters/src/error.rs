//! Routing failures.

use thiserror::Error;

/// Result alias for router chains.
pub type RouteResult<T> = Result<T, RouteError>;

/// No endpoint of the interface has its traffic flag open.
///
/// Fatal for the call: the caller must fail immediately instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "traffic switch is not open on any provider of {interface}; \
     ask the service owner to open traffic for it"
)]
pub struct RoutingBlockedError {
    /// The interface the call targeted.
    pub interface: String,
}

/// Why a router chain refused to produce endpoints for a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The traffic gate found no open endpoint.
    #[error(transparent)]
    Blocked(#[from] RoutingBlockedError),
    /// A custom router refused the call.
    #[error("router `{router}` rejected the call: {reason}")]
    Rejected {
        /// Name of the rejecting router.
        router: String,
        /// Human readable reason.
        reason: String,
    },
}
