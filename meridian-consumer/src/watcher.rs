//! Registry notification loop.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use meridian_core::domain::attributes::Attributes;
use meridian_core::throttle::LogThrottle;
use meridian_core::DiscoveryConfig;
use meridian_registry::attributes::config_attribute;
use meridian_registry::overrides::{override_attribute, targets_host};
use meridian_registry::{AttributeError, ChangeKind, RegistryEntry, SnapshotTranslator};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::directory::ServiceDirectory;

/// A change notification delivered by the coordination client.
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// The provider or configurator children of an interface changed. Carries the
    /// complete current listing of both subtrees.
    Providers {
        /// Interface the listing belongs to.
        interface: String,
        /// Watched providers subtree.
        providers_path: String,
        /// Every provider node.
        providers: Vec<RegistryEntry>,
        /// Every configurator node.
        configurators: Vec<RegistryEntry>,
    },
    /// One consumer-local override node changed.
    Override {
        /// Interface the override belongs to.
        interface: String,
        /// Watched overrides subtree.
        overrides_path: String,
        /// The changed node.
        entry: RegistryEntry,
        /// What happened to it.
        change: ChangeKind,
    },
    /// One node of the interface's `config` subtree changed.
    Config {
        /// Interface the attribute belongs to.
        interface: String,
        /// Watched config subtree.
        config_path: String,
        /// The changed node.
        entry: RegistryEntry,
        /// What happened to it.
        change: ChangeKind,
    },
}

impl RegistryEvent {
    /// Interface the event concerns.
    pub fn interface(&self) -> &str {
        match self {
            RegistryEvent::Providers { interface, .. }
            | RegistryEvent::Override { interface, .. }
            | RegistryEvent::Config { interface, .. } => interface,
        }
    }
}

/// Applies registry events to a [`ServiceDirectory`].
#[derive(Debug, Clone)]
pub struct RegistryWatcher {
    directory: ServiceDirectory,
    translator: SnapshotTranslator,
    config: Arc<DiscoveryConfig>,
    /// Rejection log throttles, one per interface.
    throttles: Arc<DashMap<String, LogThrottle>>,
}

impl RegistryWatcher {
    /// A watcher publishing into `directory` with `config`'s settings.
    pub fn new(config: &DiscoveryConfig, directory: ServiceDirectory) -> Self {
        Self {
            directory,
            translator: SnapshotTranslator::new(config),
            config: Arc::new(config.clone()),
            throttles: Arc::new(DashMap::new()),
        }
    }

    /// The directory being updated.
    pub fn directory(&self) -> &ServiceDirectory {
        &self.directory
    }

    /// Apply one event synchronously.
    ///
    /// On a decoding failure nothing is published and the previous snapshot stays in
    /// place.
    pub fn handle(&self, event: &RegistryEvent) -> Result<(), AttributeError> {
        match event {
            RegistryEvent::Providers {
                interface,
                providers_path,
                providers,
                configurators,
            } => {
                let table = self.directory.table_for(interface);
                self.translator
                    .translate_into(&table, providers_path, providers, configurators)?;
            }
            RegistryEvent::Override {
                interface,
                overrides_path,
                entry,
                change,
            } => {
                let Some(consumer) = self.directory.consumer(interface) else {
                    tracing::debug!(%interface, "override for unbound interface ignored");
                    return Ok(());
                };
                let local_host = self.config.local_host.as_deref().unwrap_or_default();
                if !targets_host(overrides_path, entry, local_host)? {
                    return Ok(());
                }
                let attributes =
                    override_attribute(overrides_path, entry, *change, consumer.config())?;
                consumer.apply_override_attributes(&attributes);
            }
            RegistryEvent::Config {
                interface,
                config_path,
                entry,
                change,
            } => {
                let Some(consumer) = self.directory.consumer(interface) else {
                    tracing::debug!(%interface, "config attribute for unbound interface ignored");
                    return Ok(());
                };
                let (key, value) = config_attribute(config_path, entry, *change, &self.config)?;
                consumer.apply_override_attributes(&Attributes::from_iter([(key, value)]));
            }
        }
        Ok(())
    }

    /// Log a rejected event. Repeats for the same interface are throttled.
    fn report(&self, event: &RegistryEvent, error: &AttributeError) {
        let interface = event.interface();
        let throttle = self
            .throttles
            .entry(interface.to_string())
            .or_insert_with(|| {
                LogThrottle::new(
                    Duration::from_millis(self.config.log_wait_millis),
                    self.config.disable_throttled_logs,
                )
            });
        throttle.run(|| {
            tracing::error!(
                interface,
                %error,
                "registry update rejected, keeping previous snapshot"
            )
        });
    }
}

/// Spawns a background Tokio task that applies registry events until the sender side
/// of `events` is dropped.
pub fn spawn_registry_watcher(
    watcher: RegistryWatcher,
    mut events: mpsc::Receiver<RegistryEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Err(error) = watcher.handle(&event) {
                watcher.report(&event, &error);
            }
        }
        tracing::info!("registry event channel closed, watcher stopped");
    })
}
