//! Replica-operation policies for the storage coordinator.
//!
//! For a single logical operation against the replicas of one partition, a
//! policy decides:
//! - In what order replicas are tried (local datacenter first)
//! - How many requests may be outstanding at once
//! - When enough responses arrived for the operation to succeed
//! - When the operation can never succeed
//!
//! Policies perform no I/O. The operation driver sends requests, reports the
//! outcomes back, and stops on completion or when the policy says the
//! operation is unsatisfiable.

pub mod config;
pub mod error;
pub mod ordering;
pub mod policy;
pub mod shared;

pub use config::{OperationKind, PolicyConfig, PolicyFactory};
pub use error::{PolicyError, Result};
pub use policy::{
    FanoutDeleteOrExpirePolicy, OperationPolicy, OperationStatus, ParallelQuorumPolicy, Policy,
    QuorumThresholds, SerialGetPolicy, WritePolicy,
};
pub use shared::SharedPolicy;
