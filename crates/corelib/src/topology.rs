//! Cluster topology registry.
//!
//! Holds the nodes of the cluster and the partitions they host, and resolves
//! a `PartitionId` into a [`Partition`] whose replicas point at shared node
//! metadata. Both maps are concurrent so lookups from many operation drivers
//! never contend on a single lock.

use crate::error::{Error, Result};
use crate::node::{Node, NodeId};
use crate::partition::{Partition, PartitionId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// In-memory view of nodes and partition placement.
#[derive(Debug, Default)]
pub struct Topology {
    nodes: DashMap<NodeId, Arc<Node>>,
    partitions: DashMap<PartitionId, Partition>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a node.
    ///
    /// Replacing a node does not rewrite partitions already registered; they
    /// keep the metadata they were built with.
    pub fn add_node(&self, node: Node) -> Result<Arc<Node>> {
        if node.name.is_empty() {
            return Err(Error::InvalidNode(format!("node {} has an empty name", node.id)));
        }
        let node = Arc::new(node);
        self.nodes.insert(node.id, Arc::clone(&node));
        Ok(node)
    }

    pub fn get_node(&self, id: &NodeId) -> Option<Arc<Node>> {
        self.nodes.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Register a partition hosted on `node_ids`, in that order.
    ///
    /// Every node must already be registered and may appear only once. An
    /// empty node list is accepted: such a partition is misconfigured, and
    /// policies built over it refuse to start.
    pub fn add_partition(&self, id: PartitionId, node_ids: &[NodeId]) -> Result<Partition> {
        let mut seen = HashSet::with_capacity(node_ids.len());
        let nodes = node_ids
            .iter()
            .map(|node_id| {
                if !seen.insert(*node_id) {
                    return Err(Error::DuplicateReplica {
                        node: *node_id,
                        partition: id,
                    });
                }
                self.get_node(node_id).ok_or(Error::UnknownNode {
                    node: *node_id,
                    partition: id,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        match self.partitions.entry(id) {
            Entry::Occupied(_) => Err(Error::DuplicatePartition(id)),
            Entry::Vacant(slot) => {
                let partition = Partition::new(id, nodes);
                slot.insert(partition.clone());
                Ok(partition)
            }
        }
    }

    pub fn partition(&self, id: PartitionId) -> Option<Partition> {
        self.partitions.get(&id).map(|entry| entry.value().clone())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }
}
