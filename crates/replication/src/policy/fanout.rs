//! Fan-out policy for deletes and TTL updates.
//!
//! Sends requests to every replica at once. Deletes and expirations are
//! idempotent and cheap, and should reach all copies promptly; the operation
//! is durable after 2 confirmations as long as the partition has more than 2
//! replicas.
//!
//! | replicas | success target | parallelism |
//! |----------|----------------|-------------|
//! | 1        | 1              | 1           |
//! | 2        | 1              | 2           |
//! | n >= 3   | 2              | n           |

use crate::error::Result;
use crate::policy::parallel::{ParallelQuorumPolicy, QuorumThresholds};
use crate::policy::OperationPolicy;
use corelib::{PartitionView, ReplicaLocation};
use rand::Rng;
use std::collections::HashSet;

#[derive(Debug)]
pub struct FanoutDeleteOrExpirePolicy<R: ReplicaLocation> {
    inner: ParallelQuorumPolicy<R>,
}

impl<R: ReplicaLocation> FanoutDeleteOrExpirePolicy<R> {
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
            n => QuorumThresholds::new(2, n),
        }
    }

    pub fn thresholds(&self) -> QuorumThresholds {
        self.inner.thresholds()
    }
}

impl<R: ReplicaLocation> OperationPolicy for FanoutDeleteOrExpirePolicy<R> {
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
        "FanoutDeleteOrExpirePolicy"
    }
}
