//! Lock-free directory of watched services using DashMap.

use std::sync::Arc;

use dashmap::DashMap;
use meridian_core::{ConsumerConfig, SharedSnapshotTable, SnapshotTable};
use meridian_filters::RouterRegistration;

use crate::binding::{ConsumerBinding, SharedConsumerBinding};

/// Snapshot tables and consumer bindings of one process, keyed by interface.
#[derive(Debug, Clone, Default)]
pub struct ServiceDirectory {
    tables: Arc<DashMap<String, SharedSnapshotTable>>,
    consumers: Arc<DashMap<String, SharedConsumerBinding>>,
}

impl ServiceDirectory {
    /// Creates a new empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot table of `interface`, created empty on first use.
    pub fn table_for(&self, interface: &str) -> SharedSnapshotTable {
        if let Some(table) = self.tables.get(interface) {
            return Arc::clone(table.value());
        }
        self.tables
            .entry(interface.to_string())
            .or_insert_with(|| Arc::new(SnapshotTable::new()))
            .value()
            .clone()
    }

    /// The snapshot table of `interface`, if it is watched.
    pub fn table(&self, interface: &str) -> Option<SharedSnapshotTable> {
        self.tables.get(interface).map(|table| Arc::clone(table.value()))
    }

    /// Bind a consumer to its interface's table and remember it for override updates.
    ///
    /// Binding the same interface again replaces the previous binding.
    pub fn bind<I>(&self, config: ConsumerConfig, registrations: I) -> SharedConsumerBinding
    where
        I: IntoIterator<Item = RouterRegistration>,
    {
        let interface = config.interface_id.clone();
        let table = self.table_for(&interface);
        let binding = Arc::new(ConsumerBinding::new(config, registrations, table));
        self.consumers.insert(interface, Arc::clone(&binding));
        binding
    }

    /// The consumer bound to `interface`.
    pub fn consumer(&self, interface: &str) -> Option<SharedConsumerBinding> {
        self.consumers
            .get(interface)
            .map(|binding| Arc::clone(binding.value()))
    }

    /// Stop tracking `interface`. In-flight readers keep their snapshot.
    pub fn remove(&self, interface: &str) -> Option<SharedSnapshotTable> {
        self.consumers.remove(interface);
        self.tables.remove(interface).map(|(_, table)| table)
    }

    /// Number of watched interfaces.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True when nothing is watched.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
