//! Meridian Consumer Engine
//!
//! Wires the pieces together for the consumers of one process: a directory of published
//! snapshots, one resolved router chain per consumer, and the Tokio task that re-translates
//! registry notifications into new snapshots.

pub mod binding;
pub mod directory;
pub mod watcher;

pub use binding::{ConsumerBinding, SharedConsumerBinding};
pub use directory::ServiceDirectory;
pub use watcher::{spawn_registry_watcher, RegistryEvent, RegistryWatcher};
