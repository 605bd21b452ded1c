//! Serial probing policy (read path).
//!
//! Sends one request at a time, local replicas first, until a replica answers
//! successfully. A read needs exactly one good copy, so probing serially keeps
//! load and network use minimal when the first replica answers.

use crate::error::Result;
use crate::policy::probe::LocalFirstProbe;
use crate::policy::OperationPolicy;
use corelib::{PartitionView, ReplicaLocation};
use rand::Rng;
use std::collections::HashSet;

#[derive(Debug)]
pub struct SerialGetPolicy<R: ReplicaLocation> {
    probe: LocalFirstProbe<R>,
}

impl<R: ReplicaLocation> SerialGetPolicy<R> {
    pub fn new<P, G>(local_datacenter: &str, partition: &P, rng: &mut G) -> Result<Self>
    where
        P: PartitionView<Replica = R>,
        G: Rng + ?Sized,
    {
        Ok(Self {
            probe: LocalFirstProbe::new(local_datacenter, partition, rng)?,
        })
    }
}

impl<R: ReplicaLocation> OperationPolicy for SerialGetPolicy<R> {
    type Replica = R;

    fn should_send_more(&self, in_flight: &HashSet<R>) -> bool {
        !self.is_complete() && self.probe.has_pending() && in_flight.is_empty()
    }

    fn is_complete(&self) -> bool {
        self.probe.success_count() >= 1
    }

    fn may_complete(&self) -> bool {
        self.probe.failure_count() < self.probe.replica_count()
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
        "SerialGetPolicy"
    }
}
