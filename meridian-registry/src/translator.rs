//! Registry snapshot translation.

use meridian_core::error::DecodeResult;
use meridian_core::weight::WarmupEngine;
use meridian_core::{DiscoveryConfig, Endpoint, EndpointUrl, SnapshotTable};

use crate::entry::RegistryEntry;
use crate::overrides::{merge_override, parse_configurators, OverrideMap};
use crate::paths::entry_suffix;

/// Converts raw provider and configurator nodes into endpoints.
///
/// Translation works on owned data only and has no side effects, so it may run on a
/// notification thread while calls keep routing against the published snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotTranslator {
    default_weight: u32,
}

impl Default for SnapshotTranslator {
    fn default() -> Self {
        Self::new(&DiscoveryConfig::default())
    }
}

impl SnapshotTranslator {
    /// A translator applying `config`'s default weight.
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            default_weight: config.default_weight,
        }
    }

    /// Translate a full provider listing.
    ///
    /// Configurator overrides are merged into the endpoint with the same address before
    /// warmup processing. Any decoding failure aborts the whole batch.
    pub fn translate(
        &self,
        providers_path: &str,
        providers: &[RegistryEntry],
        configurators: &[RegistryEntry],
    ) -> DecodeResult<Vec<Endpoint>> {
        if providers.is_empty() {
            return Ok(Vec::new());
        }
        let overrides = parse_configurators(providers_path, configurators)?;

        providers
            .iter()
            .map(|entry| self.materialize(providers_path, entry, &overrides))
            .collect()
    }

    /// Translate and, only on success, publish into `table`. Returns the new revision.
    pub fn translate_into(
        &self,
        table: &SnapshotTable,
        providers_path: &str,
        providers: &[RegistryEntry],
        configurators: &[RegistryEntry],
    ) -> DecodeResult<u64> {
        let endpoints = self.translate(providers_path, providers, configurators)?;
        let count = endpoints.len();
        let revision = table.publish(endpoints);
        tracing::info!(path = providers_path, count, revision, "provider snapshot updated");
        Ok(revision)
    }

    fn materialize(
        &self,
        providers_path: &str,
        entry: &RegistryEntry,
        overrides: &OverrideMap,
    ) -> DecodeResult<Endpoint> {
        let url = EndpointUrl::decode(entry_suffix(providers_path, entry.path())?)?;
        let merged = merge_override(&url, overrides);
        let mut endpoint = Endpoint::from_url(&merged, self.default_weight);
        WarmupEngine::process(&mut endpoint)?;
        Ok(endpoint)
    }
}
