//! Meridian Core functionality.
//!
//! This crate contains the endpoint model, the warmup weight engine, the registry URL codec
//! and the lock-free snapshot table that power Meridian service discovery.

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod throttle;
pub mod url;
pub mod weight;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConsumerConfig, DiscoveryConfig, PropertyAccessor, ProviderConfig};
pub use domain::endpoint::{Endpoint, EndpointStatus, SharedEndpoint};
pub use domain::snapshot::{EndpointList, EndpointSnapshot, SharedSnapshotTable, SnapshotTable};
pub use error::{ConfigAccessorError, ConfigError, RegistryDecodeError};
pub use url::EndpointUrl;
