//! Local-first probing and response accounting shared by every policy.
//!
//! `LocalFirstProbe` owns the ordered replica queue and the response ledger.
//! Concrete policies compose one and layer their own admission and
//! completion rules on top of its counts.
//!
//! # Invariants
//!
//! - A replica leaves the queue at most once and is never re-queued
//! - A replica is reported at most once, and only after it was dequeued
//! - `succeeded` and `failed` are disjoint and only ever grow

use crate::error::{PolicyError, Result};
use crate::ordering::order_replicas;
use corelib::{PartitionId, PartitionView, ReplicaLocation};
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, error, trace, warn};

#[derive(Debug)]
pub struct LocalFirstProbe<R: ReplicaLocation> {
    partition: PartitionId,
    replica_count: usize,
    queue: VecDeque<R>,
    /// Dequeued, not yet reported.
    outstanding: HashSet<R>,
    succeeded: Vec<R>,
    failed: Vec<R>,
}

impl<R: ReplicaLocation> LocalFirstProbe<R> {
    /// Resolve the partition's replicas once and order them for probing.
    pub fn new<P, G>(local_datacenter: &str, partition: &P, rng: &mut G) -> Result<Self>
    where
        P: PartitionView<Replica = R>,
        G: Rng + ?Sized,
    {
        let replicas = partition.replicas();
        let replica_count = replicas.len();
        if replica_count < 1 {
            error!(
                partition = %partition.id(),
                replica_count,
                "partition has invalid number of replicas"
            );
            return Err(PolicyError::Configuration {
                partition: partition.id(),
                reason: "no replicas",
            });
        }

        let distinct: HashSet<&R> = replicas.iter().collect();
        if distinct.len() != replica_count {
            error!(
                partition = %partition.id(),
                replica_count,
                distinct = distinct.len(),
                "partition lists the same replica more than once"
            );
            return Err(PolicyError::Configuration {
                partition: partition.id(),
                reason: "duplicate replicas",
            });
        }

        let queue = order_replicas(local_datacenter, replicas, rng);
        debug!(
            partition = %partition.id(),
            local_datacenter,
            order = ?queue,
            "ordered replicas for probing"
        );

        Ok(Self {
            partition: partition.id(),
            replica_count,
            queue,
            outstanding: HashSet::with_capacity(replica_count),
            succeeded: Vec::with_capacity(replica_count),
            failed: Vec::with_capacity(replica_count),
        })
    }

    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    #[inline]
    pub fn replica_count(&self) -> usize {
        self.replica_count
    }

    #[inline]
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    #[inline]
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// True while at least one replica has not been handed out yet.
    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Remove and return the head of the queue.
    pub fn next_replica(&mut self) -> Result<R> {
        let replica = self.queue.pop_front().ok_or_else(|| {
            warn!(partition = %self.partition, "next replica requested from exhausted queue");
            PolicyError::Exhausted {
                partition: self.partition,
            }
        })?;
        trace!(
            partition = %self.partition,
            ?replica,
            remaining = self.queue.len(),
            "dequeued replica"
        );
        self.outstanding.insert(replica.clone());
        Ok(replica)
    }

    pub fn record_success(&mut self, replica: &R) -> Result<()> {
        self.settle(replica)?;
        self.succeeded.push(replica.clone());
        debug!(
            partition = %self.partition,
            ?replica,
            successes = self.succeeded.len(),
            "replica request succeeded"
        );
        Ok(())
    }

    pub fn record_failure(&mut self, replica: &R) -> Result<()> {
        self.settle(replica)?;
        self.failed.push(replica.clone());
        debug!(
            partition = %self.partition,
            ?replica,
            failures = self.failed.len(),
            "replica request failed"
        );
        Ok(())
    }

    /// Move `replica` out of the outstanding set, rejecting reports for
    /// replicas that were never dequeued or were already reported.
    fn settle(&mut self, replica: &R) -> Result<()> {
        if self.outstanding.remove(replica) {
            return Ok(());
        }
        let err = if self.succeeded.contains(replica) || self.failed.contains(replica) {
            PolicyError::DuplicateResponse {
                replica: format!("{replica:?}"),
            }
        } else {
            PolicyError::UnknownReplica {
                replica: format!("{replica:?}"),
            }
        };
        warn!(partition = %self.partition, ?replica, %err, "rejected response report");
        Err(err)
    }
}
