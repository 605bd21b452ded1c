//! Parallel quorum policy (write / fan-out path).
//!
//! Sends several requests in parallel and waits for a threshold number of
//! successes.
//!
//! # Admission
//!
//! - `request_parallelism >= success_target`: keep
//!   `request_parallelism - successes` requests in flight. Each success frees
//!   its slot for a fresh replica, so the "additional" requests stay
//!   outstanding in the face of failures and stragglers.
//! - `request_parallelism < success_target`: keep
//!   `min(request_parallelism, success_target - successes)` in flight. No
//!   additional requests beyond what is still needed.
//!
//! Admission stops once the queue is empty, once the operation is complete,
//! and once it can no longer complete.

use crate::error::{PolicyError, Result};
use crate::policy::probe::LocalFirstProbe;
use crate::policy::OperationPolicy;
use corelib::{PartitionView, ReplicaLocation};
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Durability threshold and fan-out width of a parallel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumThresholds {
    /// Successful responses needed before the operation is complete.
    pub success_target: usize,
    /// Requests initially sent in parallel.
    pub request_parallelism: usize,
}

impl QuorumThresholds {
    pub const fn new(success_target: usize, request_parallelism: usize) -> Self {
        Self {
            success_target,
            request_parallelism,
        }
    }

    /// Number of requests that should be in flight after `successes`
    /// successful responses.
    pub fn in_flight_target(&self, successes: usize) -> usize {
        if self.request_parallelism >= self.success_target {
            self.request_parallelism.saturating_sub(successes)
        } else {
            self.request_parallelism
                .min(self.success_target.saturating_sub(successes))
        }
    }

    fn validate(&self, replica_count: usize) -> Result<()> {
        if self.success_target == 0
            || self.request_parallelism == 0
            || self.success_target > replica_count
        {
            return Err(PolicyError::InvalidThresholds {
                replica_count,
                success_target: self.success_target,
                request_parallelism: self.request_parallelism,
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ParallelQuorumPolicy<R: ReplicaLocation> {
    probe: LocalFirstProbe<R>,
    thresholds: QuorumThresholds,
}

impl<R: ReplicaLocation> ParallelQuorumPolicy<R> {
    /// Build a policy whose thresholds depend on the partition's replica
    /// count.
    pub fn with_table<P, G, F>(
        local_datacenter: &str,
        partition: &P,
        rng: &mut G,
        table: F,
    ) -> Result<Self>
    where
        P: PartitionView<Replica = R>,
        G: Rng + ?Sized,
        F: FnOnce(usize) -> QuorumThresholds,
    {
        let probe = LocalFirstProbe::new(local_datacenter, partition, rng)?;
        let thresholds = table(probe.replica_count());
        Self::from_probe(probe, thresholds)
    }

    /// Build a policy with explicit thresholds.
    ///
    /// # Errors
    /// `PolicyError::InvalidThresholds` if either threshold is zero or the
    /// success target exceeds the replica count.
    pub fn new<P, G>(
        local_datacenter: &str,
        partition: &P,
        rng: &mut G,
        thresholds: QuorumThresholds,
    ) -> Result<Self>
    where
        P: PartitionView<Replica = R>,
        G: Rng + ?Sized,
    {
        Self::with_table(local_datacenter, partition, rng, |_| thresholds)
    }

    fn from_probe(probe: LocalFirstProbe<R>, thresholds: QuorumThresholds) -> Result<Self> {
        thresholds.validate(probe.replica_count())?;
        debug!(
            partition = %probe.partition(),
            replica_count = probe.replica_count(),
            success_target = thresholds.success_target,
            request_parallelism = thresholds.request_parallelism,
            "parallel quorum policy ready"
        );
        Ok(Self { probe, thresholds })
    }

    pub fn thresholds(&self) -> QuorumThresholds {
        self.thresholds
    }

    pub fn success_target(&self) -> usize {
        self.thresholds.success_target
    }

    pub fn request_parallelism(&self) -> usize {
        self.thresholds.request_parallelism
    }
}

impl<R: ReplicaLocation> OperationPolicy for ParallelQuorumPolicy<R> {
    type Replica = R;

    fn should_send_more(&self, in_flight: &HashSet<R>) -> bool {
        if !self.probe.has_pending() || self.is_complete() || !self.may_complete() {
            return false;
        }
        in_flight.len() < self.thresholds.in_flight_target(self.probe.success_count())
    }

    fn is_complete(&self) -> bool {
        self.probe.success_count() >= self.thresholds.success_target
    }

    fn may_complete(&self) -> bool {
        let remaining = self
            .probe
            .replica_count()
            .saturating_sub(self.probe.failure_count());
        remaining >= self.thresholds.success_target
    }

    fn on_success(&mut self, replica: &R) -> Result<()> {
        self.probe.record_success(replica)
    }

    fn on_failure(&mut self, replica: &R) -> Result<()> {
        self.probe.record_failure(replica)
    }

    fn next_replica(&mut self) -> Result<R> {
        self.probe.next_replica()
    }

    fn replica_count(&self) -> usize {
        self.probe.replica_count()
    }

    fn name(&self) -> &'static str {
        "ParallelQuorumPolicy"
    }
}
