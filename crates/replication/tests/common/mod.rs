//! Shared fixtures for policy integration tests.

#![allow(dead_code)]

use corelib::{Node, NodeId, Partition, PartitionId, Topology};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const LOCAL_DC: &str = "dc-local";
pub const REMOTE_DC: &str = "dc-remote";

/// Register `local` nodes in `LOCAL_DC` and `remote` nodes in `REMOTE_DC`,
/// and one partition spanning all of them.
pub fn partition(local: usize, remote: usize) -> Partition {
    let topology = Topology::new();
    let mut ids = Vec::with_capacity(local + remote);
    for i in 0..local + remote {
        let dc = if i < local { LOCAL_DC } else { REMOTE_DC };
        let id = NodeId(i as u128);
        topology
            .add_node(Node::new(id, format!("store-{i}")).in_datacenter(dc))
            .unwrap();
        ids.push(id);
    }
    topology.add_partition(PartitionId(1), &ids).unwrap()
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
