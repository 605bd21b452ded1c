//! Write policy (durability-biased fan-out).
//!
//! Sends requests in parallel: the durability threshold plus one for good
//! luck. The durability threshold is 2 as long as the partition has more than
//! 2 replicas; smaller partitions relax it to what is achievable.
//!
//! | replicas | success target | parallelism |
//! |----------|----------------|-------------|
//! | 1        | 1              | 1           |
//! | 2        | 1              | 2           |
//! | >= 3     | 2              | 3           |

use crate::error::Result;
use crate::policy::parallel::{ParallelQuorumPolicy, QuorumThresholds};
use crate::policy::OperationPolicy;
use corelib::{PartitionView, ReplicaLocation};
use rand::Rng;
use std::collections::HashSet;

#[derive(Debug)]
pub struct WritePolicy<R: ReplicaLocation> {
    inner: ParallelQuorumPolicy<R>,
}

impl<R: ReplicaLocation> WritePolicy<R> {
    pub fn new<P, G>(local_datacenter: &str, partition: &P, rng: &mut G) -> Result<Self>
    where
        P: PartitionView<Replica = R>,
        G: Rng + ?Sized,
    {
        Ok(Self {
            inner: ParallelQuorumPolicy::with_table(
                local_datacenter,
                partition,
                rng,
                Self::thresholds_for,
            )?,
        })
    }

    /// Thresholds for a partition with `replica_count` replicas.
    pub fn thresholds_for(replica_count: usize) -> QuorumThresholds {
        match replica_count {
            0 | 1 => QuorumThresholds::new(1, 1),
            2 => QuorumThresholds::new(1, 2),
            _ => QuorumThresholds::new(2, 3),
        }
    }

    pub fn thresholds(&self) -> QuorumThresholds {
        self.inner.thresholds()
    }
}

impl<R: ReplicaLocation> OperationPolicy for WritePolicy<R> {
    type Replica = R;

    fn should_send_more(&self, in_flight: &HashSet<R>) -> bool {
        self.inner.should_send_more(in_flight)
    }

    fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }

    fn may_complete(&self) -> bool {
        self.inner.may_complete()
    }

    fn on_success(&mut self, replica: &R) -> Result<()> {
        self.inner.on_success(replica)
    }

    fn on_failure(&mut self, replica: &R) -> Result<()> {
        self.inner.on_failure(replica)
    }

    fn next_replica(&mut self) -> Result<R> {
        self.inner.next_replica()
    }

    fn replica_count(&self) -> usize {
        self.inner.replica_count()
    }

    fn name(&self) -> &'static str {
        "WritePolicy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{Node, NodeId, Partition, PartitionId, Replica};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn policy(count: u128) -> WritePolicy<Replica> {
        let nodes = (0..count).map(|i| {
            Arc::new(Node::new(NodeId(i), format!("node{i}")).in_datacenter("dc1"))
        });
        let partition = Partition::new(PartitionId(4), nodes);
        WritePolicy::new("dc1", &partition, &mut StdRng::seed_from_u64(5)).unwrap()
    }

    #[test]
    fn test_threshold_table() {
        assert_eq!(policy(1).thresholds(), QuorumThresholds::new(1, 1));
        assert_eq!(policy(2).thresholds(), QuorumThresholds::new(1, 2));
        assert_eq!(policy(3).thresholds(), QuorumThresholds::new(2, 3));
        assert_eq!(policy(7).thresholds(), QuorumThresholds::new(2, 3));
    }

    #[test]
    fn test_sends_target_plus_one() {
        let mut policy = policy(7);
        let mut in_flight = HashSet::new();
        while policy.should_send_more(&in_flight) {
            in_flight.insert(policy.next_replica().unwrap());
        }
        assert_eq!(in_flight.len(), 3);
        assert_eq!(policy.name(), "WritePolicy");
    }

    #[test]
    fn test_single_replica_write() {
        let mut policy = policy(1);
        let replica = policy.next_replica().unwrap();
        policy.on_failure(&replica).unwrap();
        assert!(!policy.may_complete());
        assert!(!policy.should_send_more(&HashSet::new()));
    }
}
