//! Meridian Registry Translation
//!
//! Turns the raw children of watched registry subtrees into merged, warmup-processed
//! endpoints and into override attribute sets for local consumers.

pub mod attributes;
pub mod entry;
pub mod error;
pub mod overrides;
pub mod paths;
pub mod translator;

pub use entry::{ChangeKind, RegistryEntry};
pub use error::AttributeError;
pub use overrides::{OverridableKey, OverrideEntry, OverrideMap};
pub use paths::ServicePaths;
pub use translator::SnapshotTranslator;
