//! Tests for the topology registry and partition resolution.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: Empty topology, add nodes, add partitions
//! 2. **Resolution**: Replicas share node metadata, keep placement order
//! 3. **Edge cases**: Unknown nodes, duplicate partitions and replicas, empty partitions
//! 4. **Thread safety**: Concurrent registration, racing registrations of one id

use corelib::{Error, Node, NodeId, PartitionId, PartitionView, ReplicaLocation, Topology};
use std::sync::{Arc, Barrier};

fn node(id: u128, dc: &str) -> Node {
    Node::new(NodeId(id), format!("node{id}")).in_datacenter(dc)
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_topology() {
    let topology = Topology::new();
    assert_eq!(topology.node_count(), 0);
    assert_eq!(topology.partition_count(), 0);
    assert!(topology.partition(PartitionId(1)).is_none());
    assert!(topology.get_node(&NodeId(1)).is_none());
}

#[test]
fn test_add_node_and_partition() {
    let topology = Topology::new();
    topology.add_node(node(1, "dc1")).unwrap();
    topology.add_node(node(2, "dc1")).unwrap();
    topology.add_node(node(3, "dc2")).unwrap();

    let partition = topology
        .add_partition(PartitionId(10), &[NodeId(3), NodeId(1), NodeId(2)])
        .unwrap();
    assert_eq!(partition.id(), PartitionId(10));
    assert_eq!(partition.replica_count(), 3);
    assert_eq!(topology.partition_count(), 1);

    // Resolution keeps placement order
    let resolved = topology.partition(PartitionId(10)).unwrap();
    let ids: Vec<NodeId> = resolved.replicas().iter().map(|r| r.node_id()).collect();
    assert_eq!(ids, vec![NodeId(3), NodeId(1), NodeId(2)]);
    assert_eq!(resolved.replicas()[0].datacenter(), Some("dc2"));
}

#[test]
fn test_replicas_share_node_metadata() {
    let topology = Topology::new();
    let stored = topology.add_node(node(1, "dc1")).unwrap();
    topology.add_node(node(2, "dc1")).unwrap();

    let p1 = topology.add_partition(PartitionId(1), &[NodeId(1)]).unwrap();
    let p2 = topology.add_partition(PartitionId(2), &[NodeId(1), NodeId(2)]).unwrap();

    assert!(Arc::ptr_eq(&p1.replicas()[0].node, &stored));
    assert!(Arc::ptr_eq(&p2.replicas()[0].node, &stored));
    // Same node, different partitions: different replicas
    assert_ne!(p1.replicas()[0], p2.replicas()[0]);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_unknown_node_rejected() {
    let topology = Topology::new();
    topology.add_node(node(1, "dc1")).unwrap();

    let err = topology
        .add_partition(PartitionId(5), &[NodeId(1), NodeId(42)])
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnknownNode {
            node: NodeId(42),
            partition: PartitionId(5)
        }
    );
    assert!(topology.partition(PartitionId(5)).is_none(), "Nothing registered on error");
}

#[test]
fn test_duplicate_partition_rejected() {
    let topology = Topology::new();
    topology.add_node(node(1, "dc1")).unwrap();
    topology.add_partition(PartitionId(1), &[NodeId(1)]).unwrap();

    let err = topology.add_partition(PartitionId(1), &[NodeId(1)]).unwrap_err();
    assert_eq!(err, Error::DuplicatePartition(PartitionId(1)));
}

#[test]
fn test_duplicate_node_rejected() {
    let topology = Topology::new();
    topology.add_node(node(1, "dc1")).unwrap();
    topology.add_node(node(2, "dc2")).unwrap();

    let err = topology
        .add_partition(PartitionId(4), &[NodeId(1), NodeId(2), NodeId(1)])
        .unwrap_err();
    assert_eq!(
        err,
        Error::DuplicateReplica {
            node: NodeId(1),
            partition: PartitionId(4)
        }
    );
    assert!(topology.partition(PartitionId(4)).is_none(), "Nothing registered on error");

    // The id stays free for a correct placement
    let partition = topology
        .add_partition(PartitionId(4), &[NodeId(1), NodeId(2)])
        .unwrap();
    assert_eq!(partition.replica_count(), 2);
}

#[test]
fn test_empty_name_rejected() {
    let topology = Topology::new();
    let err = topology.add_node(Node::new(NodeId(1), "")).unwrap_err();
    assert!(matches!(err, Error::InvalidNode(_)));
}

#[test]
fn test_empty_partition_is_registered() {
    // Misconfigured partitions still resolve; policies reject them later
    let topology = Topology::new();
    let partition = topology.add_partition(PartitionId(3), &[]).unwrap();
    assert_eq!(partition.replica_count(), 0);
    assert!(topology.partition(PartitionId(3)).is_some());
}

// ============================================================================
// Thread Safety
// ============================================================================

#[test]
fn test_concurrent_registration() {
    let topology = Arc::new(Topology::new());
    let handles: Vec<_> = (0..8u128)
        .map(|i| {
            let topology = Arc::clone(&topology);
            std::thread::spawn(move || {
                topology.add_node(node(i, "dc1")).unwrap();
                topology
                    .add_partition(PartitionId(i as u64), &[NodeId(i)])
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(topology.node_count(), 8);
    assert_eq!(topology.partition_count(), 8);
}

#[test]
fn test_racing_registration_of_one_partition() {
    let topology = Arc::new(Topology::new());
    topology.add_node(node(1, "dc1")).unwrap();
    topology.add_node(node(2, "dc2")).unwrap();

    for round in 0..500u64 {
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [NodeId(1), NodeId(2)]
            .into_iter()
            .map(|node_id| {
                let topology = Arc::clone(&topology);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    topology.add_partition(PartitionId(round), &[node_id])
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1, "round {round}: exactly one registration wins");
        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(*loser, Error::DuplicatePartition(PartitionId(round)));

        // The stored placement is the winner's
        let stored = topology.partition(PartitionId(round)).unwrap();
        assert_eq!(stored.replicas()[0].node_id(), winners[0].replicas()[0].node_id());
    }
    assert_eq!(topology.partition_count(), 500);
}
