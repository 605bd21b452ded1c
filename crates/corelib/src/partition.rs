//! Partitions and replicas.
//!
//! A partition is a logical shard of data; each of its replicas is a copy
//! hosted on one node. Policies never own topology: they read a partition's
//! replica list once, through [`PartitionView`], and hand out
//! [`ReplicaLocation`] values to the operation driver.

use crate::node::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifier of a logical partition.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PartitionId(pub u64);

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition-{}", self.0)
    }
}

/// Identity of one physical copy of a partition.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync) because response
/// callbacks for different replicas may run on different threads.
pub trait ReplicaLocation: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Datacenter (zone) hosting this replica, if known.
    ///
    /// A replica without a datacenter label is never considered local.
    fn datacenter(&self) -> Option<&str>;
}

/// Read-only view of a partition as resolved by the cluster topology.
pub trait PartitionView {
    /// Replica identity type handed out by this partition.
    type Replica: ReplicaLocation;

    /// Partition identifier (for logging and error reporting).
    fn id(&self) -> PartitionId;

    /// Replicas of this partition, in topology order.
    fn replicas(&self) -> Vec<Self::Replica>;
}

/// A replica of `partition` hosted on `node`.
///
/// Two replicas are equal when they belong to the same partition and the same
/// node; node metadata is shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct Replica {
    pub partition: PartitionId,
    pub node: Arc<Node>,
}

impl Replica {
    pub fn new(partition: PartitionId, node: Arc<Node>) -> Self {
        Self { partition, node }
    }

    #[inline]
    pub fn node_id(&self) -> NodeId {
        self.node.id
    }
}

impl PartialEq for Replica {
    fn eq(&self, other: &Self) -> bool {
        self.partition == other.partition && self.node.id == other.node.id
    }
}

impl Eq for Replica {}

impl Hash for Replica {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.partition.hash(state);
        self.node.id.hash(state);
    }
}

impl fmt::Display for Replica {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition, self.node)
    }
}

impl ReplicaLocation for Replica {
    fn datacenter(&self) -> Option<&str> {
        self.node.datacenter_name()
    }
}

/// A partition together with its resolved replicas.
#[derive(Clone, Debug)]
pub struct Partition {
    id: PartitionId,
    replicas: Vec<Replica>,
}

impl Partition {
    /// Build a partition hosted on the given nodes, one replica per node.
    pub fn new(id: PartitionId, nodes: impl IntoIterator<Item = Arc<Node>>) -> Self {
        let replicas = nodes.into_iter().map(|node| Replica::new(id, node)).collect();
        Self { id, replicas }
    }

    pub fn replica_count(&self) -> usize {
        self.replicas.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Replica> {
        self.replicas.iter()
    }
}

impl PartitionView for Partition {
    type Replica = Replica;

    fn id(&self) -> PartitionId {
        self.id
    }

    fn replicas(&self) -> Vec<Replica> {
        self.replicas.clone()
    }
}
