//! Core library for the replica-operation policy engine.
//!
//! This crate provides the cluster-side abstractions a policy consumes:
//! - Node identity and datacenter / rack placement
//! - Partitions and the replicas that hold their data
//! - The `ReplicaLocation` / `PartitionView` seams policies are generic over
//! - A concurrent in-memory topology registry

pub mod error;
pub mod node;
pub mod partition;
pub mod topology;

pub use error::{Error, Result};
pub use node::{Node, NodeId};
pub use partition::{Partition, PartitionId, PartitionView, Replica, ReplicaLocation};
pub use topology::Topology;
