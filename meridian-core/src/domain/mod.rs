//! Domain models: endpoints, their attributes and published snapshots.

pub mod attributes;
pub mod endpoint;
pub mod snapshot;
