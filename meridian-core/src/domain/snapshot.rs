//! Published endpoint snapshots.

use arc_swap::ArcSwap;
use std::sync::Arc;
use crate::domain::endpoint::{Endpoint, SharedEndpoint};

/// An immutable, cheaply clonable list of endpoints.
pub type EndpointList = Arc<[SharedEndpoint]>;

/// One complete, internally consistent view of a service's endpoints.
#[derive(Debug, Clone)]
pub struct EndpointSnapshot {
    revision: u64,
    endpoints: EndpointList,
}

impl EndpointSnapshot {
    /// A snapshot with the given revision.
    pub fn new(revision: u64, endpoints: Vec<SharedEndpoint>) -> Self {
        Self {
            revision,
            endpoints: endpoints.into(),
        }
    }

    /// Monotonic publication counter; `0` is the initial empty snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The endpoint list. Cloning the `Arc` never copies endpoints.
    pub fn endpoints(&self) -> EndpointList {
        Arc::clone(&self.endpoints)
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// True when no endpoints are known.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// The endpoint at `host:port`.
    pub fn find(&self, host: &str, port: u16) -> Option<&SharedEndpoint> {
        self.endpoints
            .iter()
            .find(|e| e.host() == host && e.port() == port)
    }
}

impl Default for EndpointSnapshot {
    fn default() -> Self {
        Self::new(0, Vec::new())
    }
}

/// A lock-free table holding the current snapshot of one service.
///
/// Uses `ArcSwap` so a registry sync replaces the whole endpoint set atomically while
/// in-flight calls keep reading the snapshot they already loaded.
#[derive(Debug, Default)]
pub struct SnapshotTable {
    current: ArcSwap<EndpointSnapshot>,
}

impl SnapshotTable {
    /// Create an empty table at revision 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the entire endpoint set. Returns the new revision.
    pub fn publish<I>(&self, endpoints: I) -> u64
    where
        I: IntoIterator<Item = Endpoint>,
    {
        let endpoints: EndpointList = endpoints.into_iter().map(Arc::new).collect();
        let previous = self.current.rcu(|current| EndpointSnapshot {
            revision: current.revision + 1,
            endpoints: Arc::clone(&endpoints),
        });
        let revision = previous.revision + 1;
        tracing::debug!(revision, count = endpoints.len(), "published endpoint snapshot");
        revision
    }

    /// The current snapshot.
    pub fn current(&self) -> Arc<EndpointSnapshot> {
        self.current.load_full()
    }

    /// The current endpoint list.
    pub fn endpoints(&self) -> EndpointList {
        self.current.load().endpoints()
    }
}

/// A shared reference to the lock-free snapshot table.
pub type SharedSnapshotTable = Arc<SnapshotTable>;
