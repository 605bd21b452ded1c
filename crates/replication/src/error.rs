//! Error types for the policy engine.
//!
//! Every variant is a configuration or caller-contract error detected
//! synchronously at the offending call. Failed replica requests are not
//! errors here: they are reported through `OperationPolicy::on_failure` and
//! surface as `may_complete() == false`.

use corelib::PartitionId;
use thiserror::Error;

/// Result type alias for the policy engine.
pub type Result<T> = std::result::Result<T, PolicyError>;

#[derive(Debug, Error)]
pub enum PolicyError {
    /// The partition resolved to no replicas, or listed a replica twice; no
    /// operation can run on it.
    #[error("partition {partition} has invalid configuration: {reason}")]
    Configuration {
        partition: PartitionId,
        reason: &'static str,
    },

    /// `next_replica` was called with an empty replica queue.
    #[error("no replicas left to send to for partition {partition}")]
    Exhausted { partition: PartitionId },

    /// A response was reported for a replica that was never handed out.
    #[error("response reported for replica {replica} which was never sent a request")]
    UnknownReplica { replica: String },

    /// A second response was reported for the same replica.
    #[error("response already recorded for replica {replica}")]
    DuplicateResponse { replica: String },

    /// Explicit quorum thresholds that can never be satisfied or admit nothing.
    #[error(
        "invalid quorum thresholds for {replica_count} replicas: \
         success target {success_target}, parallelism {request_parallelism}"
    )]
    InvalidThresholds {
        replica_count: usize,
        success_target: usize,
        request_parallelism: usize,
    },

    #[error("invalid policy configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse policy configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl PolicyError {
    /// True for errors caused by the driver misusing a live policy, as opposed
    /// to bad configuration.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            PolicyError::Exhausted { .. }
                | PolicyError::UnknownReplica { .. }
                | PolicyError::DuplicateResponse { .. }
        )
    }
}
