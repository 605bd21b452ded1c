//! Policy configuration and construction.
//!
//! A coordinator builds one policy per logical operation. `PolicyConfig`
//! carries what is fixed for the coordinator process (its own datacenter and
//! an optional shuffle seed); `OperationKind` picks the policy:
//!
//! | kind         | policy                        |
//! |--------------|-------------------------------|
//! | `get`        | `SerialGetPolicy`             |
//! | `put`        | `WritePolicy`                 |
//! | `delete`     | `FanoutDeleteOrExpirePolicy`  |
//! | `cancel_ttl` | `FanoutDeleteOrExpirePolicy`  |
//!
//! # Example
//!
//! ```rust
//! use replication::{OperationKind, PolicyConfig, PolicyFactory};
//!
//! let config =
//!     PolicyConfig::from_json(r#"{ "local_datacenter": "us-east", "shuffle_seed": 7 }"#).unwrap();
//! let factory = PolicyFactory::new(config).unwrap();
//! assert_eq!(factory.config().local_datacenter, "us-east");
//! assert_eq!(OperationKind::CancelTtl.policy_name(), "FanoutDeleteOrExpirePolicy");
//! ```

use crate::error::{PolicyError, Result};
use crate::policy::{FanoutDeleteOrExpirePolicy, Policy, SerialGetPolicy, WritePolicy};
use crate::shared::SharedPolicy;
use corelib::PartitionView;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical operation a policy is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Get,
    Put,
    Delete,
    CancelTtl,
}

impl OperationKind {
    /// Name of the policy this kind maps to.
    pub fn policy_name(&self) -> &'static str {
        match self {
            OperationKind::Get => "SerialGetPolicy",
            OperationKind::Put => "WritePolicy",
            OperationKind::Delete | OperationKind::CancelTtl => "FanoutDeleteOrExpirePolicy",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Get => "get",
            OperationKind::Put => "put",
            OperationKind::Delete => "delete",
            OperationKind::CancelTtl => "cancel_ttl",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Datacenter of the coordinator; replicas here are probed first.
    pub local_datacenter: String,
    /// Seed for replica shuffling. `None` seeds from OS entropy.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

impl PolicyConfig {
    pub fn new(local_datacenter: impl Into<String>) -> Self {
        Self {
            local_datacenter: local_datacenter.into(),
            shuffle_seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(input: &str) -> Result<Self> {
        let config: PolicyConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.local_datacenter.trim().is_empty() {
            return Err(PolicyError::InvalidConfig(
                "local_datacenter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds policies for operations issued by one coordinator.
///
/// The factory owns the shuffle RNG, so a seeded factory yields a
/// reproducible sequence of replica orders across the policies it builds.
#[derive(Debug)]
pub struct PolicyFactory {
    config: PolicyConfig,
    rng: Mutex<StdRng>,
}

impl PolicyFactory {
    pub fn new(config: PolicyConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Build the policy for `kind` over `partition`.
    ///
    /// # Errors
    /// `PolicyError::Configuration` if the partition has no replicas.
    #[tracing::instrument(
        level = "debug",
        skip(self, partition),
        fields(partition = %partition.id())
    )]
    pub fn build<P: PartitionView>(
        &self,
        kind: OperationKind,
        partition: &P,
    ) -> Result<Policy<P::Replica>> {
        let local = self.config.local_datacenter.as_str();
        let mut rng = self.rng.lock();
        let policy: Policy<P::Replica> = match kind {
            OperationKind::Get => SerialGetPolicy::new(local, partition, &mut *rng)?.into(),
            OperationKind::Put => WritePolicy::new(local, partition, &mut *rng)?.into(),
            OperationKind::Delete | OperationKind::CancelTtl => {
                FanoutDeleteOrExpirePolicy::new(local, partition, &mut *rng)?.into()
            }
        };
        Ok(policy)
    }

    /// Build the policy for `kind` wrapped in a thread-safe handle.
    pub fn build_shared<P: PartitionView>(
        &self,
        kind: OperationKind,
        partition: &P,
    ) -> Result<SharedPolicy<Policy<P::Replica>>> {
        self.build(kind, partition).map(SharedPolicy::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::OperationPolicy;
    use corelib::{Node, NodeId, Partition, PartitionId};
    use std::sync::Arc;

    fn partition(count: u128) -> Partition {
        let nodes = (0..count).map(|i| {
            Arc::new(Node::new(NodeId(i), format!("node{i}")).in_datacenter("dc1"))
        });
        Partition::new(PartitionId(6), nodes)
    }

    #[test]
    fn test_config_from_json() {
        let config = PolicyConfig::from_json(r#"{ "local_datacenter": "dc1" }"#).unwrap();
        assert_eq!(config, PolicyConfig::new("dc1"));

        let config =
            PolicyConfig::from_json(r#"{ "local_datacenter": "dc1", "shuffle_seed": 3 }"#).unwrap();
        assert_eq!(config.shuffle_seed, Some(3));
    }

    #[test]
    fn test_config_rejects_bad_input() {
        assert!(matches!(
            PolicyConfig::from_json(r#"{ "local_datacenter": "  " }"#).unwrap_err(),
            PolicyError::InvalidConfig(_)
        ));
        assert!(matches!(
            PolicyConfig::from_json(r#"{ "local_datacenter": "dc1", "parallelism": 4 }"#)
                .unwrap_err(),
            PolicyError::ConfigParse(_)
        ));
        assert!(PolicyFactory::new(PolicyConfig::new("")).is_err());
    }

    #[test]
    fn test_operation_kind_serde() {
        let kind: OperationKind = serde_json::from_str(r#""cancel_ttl""#).unwrap();
        assert_eq!(kind, OperationKind::CancelTtl);
        assert_eq!(serde_json::to_string(&OperationKind::Put).unwrap(), r#""put""#);
        assert_eq!(OperationKind::Delete.to_string(), "delete");
    }

    #[test]
    fn test_factory_builds_matching_policy() {
        let factory = PolicyFactory::new(PolicyConfig::new("dc1").with_seed(1)).unwrap();
        for kind in [
            OperationKind::Get,
            OperationKind::Put,
            OperationKind::Delete,
            OperationKind::CancelTtl,
        ] {
            let policy = factory.build(kind, &partition(4)).unwrap();
            assert_eq!(policy.name(), kind.policy_name());
            assert_eq!(policy.replica_count(), 4);
        }
    }

    #[test]
    fn test_factory_rejects_empty_partition() {
        let factory = PolicyFactory::new(PolicyConfig::new("dc1")).unwrap();
        let err = factory.build_shared(OperationKind::Put, &partition(0)).unwrap_err();
        assert!(matches!(err, PolicyError::Configuration { .. }));
    }

    #[test]
    fn test_seeded_factories_agree() {
        let a = PolicyFactory::new(PolicyConfig::new("dc1").with_seed(99)).unwrap();
        let b = PolicyFactory::new(PolicyConfig::new("dc1").with_seed(99)).unwrap();
        let mut pa = a.build(OperationKind::Delete, &partition(6)).unwrap();
        let mut pb = b.build(OperationKind::Delete, &partition(6)).unwrap();
        for _ in 0..6 {
            assert_eq!(pa.next_replica().unwrap(), pb.next_replica().unwrap());
        }
    }
}
