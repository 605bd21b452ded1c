//! Operation policy abstractions.
//!
//! An operation policy controls, for one logical operation against one
//! partition, the probing order of replicas, how many requests are in flight
//! at a time, and when the operation is complete or can never complete.
//! Different operations need different trade-offs:
//!
//! - **SerialGetPolicy**: one request at a time until a replica answers (reads)
//! - **WritePolicy**: durability quorum plus one spare request (puts)
//! - **FanoutDeleteOrExpirePolicy**: every replica at once, quorum of two
//!   (deletes and TTL updates)
//!
//! All of them probe local-datacenter replicas first, see [`crate::ordering`].

pub mod fanout;
pub mod parallel;
pub mod probe;
pub mod serial;
pub mod write;

pub use fanout::FanoutDeleteOrExpirePolicy;
pub use parallel::{ParallelQuorumPolicy, QuorumThresholds};
pub use probe::LocalFirstProbe;
pub use serial::SerialGetPolicy;
pub use write::WritePolicy;

use crate::error::Result;
use corelib::ReplicaLocation;
use std::collections::HashSet;

/// Trait for operation policies.
///
/// A policy is a passive decision object: it never performs I/O and never
/// blocks. The operation driver loops:
/// 1. `should_send_more` with the replicas it has requests outstanding to
/// 2. if so, `next_replica` and send a request to it
/// 3. report each outcome via `on_success` / `on_failure`
/// 4. stop once `is_complete` is true or `may_complete` is false
///
/// # Thread Safety
///
/// Methods take `&self` / `&mut self`; callers sharing a policy between
/// response callbacks must serialize access, see [`crate::SharedPolicy`].
pub trait OperationPolicy: Send {
    /// Replica identity handed to the driver.
    type Replica: ReplicaLocation;

    /// Whether one or more additional requests should be in flight, given the
    /// replicas that currently have a request outstanding.
    ///
    /// Pure query; repeated calls with the same input give the same answer.
    fn should_send_more(&self, in_flight: &HashSet<Self::Replica>) -> bool;

    /// True once enough successful responses were recorded. Monotonic.
    fn is_complete(&self) -> bool;

    /// False once the operation can no longer complete whatever happens next.
    /// Monotonic.
    fn may_complete(&self) -> bool;

    /// Record a successful response from a replica returned by `next_replica`.
    fn on_success(&mut self, replica: &Self::Replica) -> Result<()>;

    /// Record a failed request: transport error, timeout or error response.
    fn on_failure(&mut self, replica: &Self::Replica) -> Result<()>;

    /// Remove and return the next replica to send a request to.
    ///
    /// # Errors
    /// `PolicyError::Exhausted` if every replica was already handed out.
    fn next_replica(&mut self) -> Result<Self::Replica>;

    /// Number of replicas in the partition.
    fn replica_count(&self) -> usize;

    /// Policy name (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Current state of the operation as seen by the driver.
    fn status(&self) -> OperationStatus {
        if self.is_complete() {
            OperationStatus::Complete
        } else if !self.may_complete() {
            OperationStatus::Unsatisfiable
        } else {
            OperationStatus::InProgress
        }
    }
}

/// Where an operation stands, derived from `is_complete` / `may_complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    /// More responses are needed and can still arrive.
    InProgress,
    /// Enough successful responses were recorded.
    Complete,
    /// Too many replicas failed for the operation to ever complete.
    Unsatisfiable,
}

impl OperationStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, OperationStatus::InProgress)
    }
}

/// The closed set of policies the coordinator builds.
#[derive(Debug)]
pub enum Policy<R: ReplicaLocation> {
    SerialGet(SerialGetPolicy<R>),
    Write(WritePolicy<R>),
    FanoutDeleteOrExpire(FanoutDeleteOrExpirePolicy<R>),
}

impl<R: ReplicaLocation> Policy<R> {
    fn inner(&self) -> &dyn OperationPolicy<Replica = R> {
        match self {
            Policy::SerialGet(p) => p,
            Policy::Write(p) => p,
            Policy::FanoutDeleteOrExpire(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn OperationPolicy<Replica = R> {
        match self {
            Policy::SerialGet(p) => p,
            Policy::Write(p) => p,
            Policy::FanoutDeleteOrExpire(p) => p,
        }
    }
}

impl<R: ReplicaLocation> OperationPolicy for Policy<R> {
    type Replica = R;

    fn should_send_more(&self, in_flight: &HashSet<R>) -> bool {
        self.inner().should_send_more(in_flight)
    }

    fn is_complete(&self) -> bool {
        self.inner().is_complete()
    }

    fn may_complete(&self) -> bool {
        self.inner().may_complete()
    }

    fn on_success(&mut self, replica: &R) -> Result<()> {
        self.inner_mut().on_success(replica)
    }

    fn on_failure(&mut self, replica: &R) -> Result<()> {
        self.inner_mut().on_failure(replica)
    }

    fn next_replica(&mut self) -> Result<R> {
        self.inner_mut().next_replica()
    }

    fn replica_count(&self) -> usize {
        self.inner().replica_count()
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}

impl<R: ReplicaLocation> From<SerialGetPolicy<R>> for Policy<R> {
    fn from(policy: SerialGetPolicy<R>) -> Self {
        Policy::SerialGet(policy)
    }
}

impl<R: ReplicaLocation> From<WritePolicy<R>> for Policy<R> {
    fn from(policy: WritePolicy<R>) -> Self {
        Policy::Write(policy)
    }
}

impl<R: ReplicaLocation> From<FanoutDeleteOrExpirePolicy<R>> for Policy<R> {
    fn from(policy: FanoutDeleteOrExpirePolicy<R>) -> Self {
        Policy::FanoutDeleteOrExpire(policy)
    }
}
