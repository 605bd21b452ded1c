//! Node abstractions for the storage cluster.
//!
//! Nodes are the physical servers that host replicas. They are identified by a
//! compact `NodeId` that is cheap to compare and hash, and carry the
//! datacenter / rack labels used for locality-aware probing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compact identifier for a node in the cluster.
///
/// Newtype over `u128` so comparisons and hashing are very fast while giving
/// plenty of space for uniqueness.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(pub u128);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Physical node hosting replicas.
///
/// Keep this struct small and cheap to clone; heavy mutable state (connections,
/// metrics, etc.) should live elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Human‑readable name or hostname.
    pub name: String,
    /// Optional data center label for locality-aware probing.
    pub datacenter: Option<String>,
    /// Optional rack label.
    pub rack: Option<String>,
}

impl Node {
    /// Construct a new node with basic metadata.
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            datacenter: None,
            rack: None,
        }
    }

    pub fn with_topology(
        id: NodeId,
        name: impl Into<String>,
        datacenter: impl Into<Option<String>>,
        rack: impl Into<Option<String>>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            datacenter: datacenter.into(),
            rack: rack.into(),
        }
    }

    /// Builder-style setter for the datacenter label.
    pub fn in_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    /// Datacenter label, if the node has one.
    pub fn datacenter_name(&self) -> Option<&str> {
        self.datacenter.as_deref()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.datacenter_name() {
            Some(dc) => write!(f, "{}@{}", self.name, dc),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datacenter_builder() {
        let node = Node::new(NodeId(7), "store-7").in_datacenter("us-east");
        assert_eq!(node.datacenter_name(), Some("us-east"));
        assert_eq!(node.to_string(), "store-7@us-east");
    }

    #[test]
    fn test_node_without_datacenter() {
        let node = Node::with_topology(NodeId(1), "store-1", None, Some("r1".to_string()));
        assert_eq!(node.datacenter_name(), None);
        assert_eq!(node.to_string(), "store-1");
    }
}
