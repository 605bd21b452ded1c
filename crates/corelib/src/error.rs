//! Error types for the core library.

use crate::node::NodeId;
use crate::partition::PartitionId;
use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid node configuration
    #[error("Invalid node: {0}")]
    InvalidNode(String),
    /// A partition references a node the topology does not know about
    #[error("Unknown node {node} referenced by partition {partition}")]
    UnknownNode { node: NodeId, partition: PartitionId },
    /// A partition with the same id is already registered
    #[error("Partition {0} is already registered")]
    DuplicatePartition(PartitionId),
    /// A partition lists the same node more than once
    #[error("Node {node} hosts more than one replica of partition {partition}")]
    DuplicateReplica { node: NodeId, partition: PartitionId },
}
