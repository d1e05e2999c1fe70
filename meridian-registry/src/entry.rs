//! Raw registry nodes as delivered by the coordination client.

use bytes::Bytes;

/// One child node of a watched registry subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    path: String,
    data: Option<Bytes>,
}

impl RegistryEntry {
    /// A node without data; endpoint and configurator nodes carry everything in the path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: None,
        }
    }

    /// A node carrying `data`.
    pub fn with_data(path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            data: Some(data.into()),
        }
    }

    /// Full node path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Node payload.
    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }
}

/// The kind of change a notification reports for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// The node appeared.
    Added,
    /// The node's data changed.
    Updated,
    /// The node was deleted.
    Removed,
}
