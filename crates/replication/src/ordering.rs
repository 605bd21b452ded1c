//! Local-datacenter-first replica ordering.
//!
//! # Algorithm
//!
//! 1. Split the replicas into those hosted in the caller's datacenter and the rest
//! 2. Shuffle each group independently
//! 3. Concatenate: local group first, remote group after
//!
//! Shuffling spreads load across replicas that are otherwise equally
//! preferable, so no single replica becomes the "always first" hotspot. The
//! order is computed once per operation and never revised.
//!
//! # Performance
//!
//! - **Time**: O(r) where r = replica count
//! - **Space**: O(r)

use corelib::ReplicaLocation;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// True if `replica` is hosted in `local_datacenter`.
#[inline]
pub fn is_local<R: ReplicaLocation>(replica: &R, local_datacenter: &str) -> bool {
    replica.datacenter() == Some(local_datacenter)
}

/// Order `replicas` for probing: local replicas first, each group shuffled
/// with `rng`.
pub fn order_replicas<R, G>(local_datacenter: &str, replicas: Vec<R>, rng: &mut G) -> VecDeque<R>
where
    R: ReplicaLocation,
    G: Rng + ?Sized,
{
    let (mut local, mut remote): (Vec<R>, Vec<R>) = replicas
        .into_iter()
        .partition(|replica| is_local(replica, local_datacenter));

    local.shuffle(rng);
    remote.shuffle(rng);

    let mut ordered = VecDeque::with_capacity(local.len() + remote.len());
    ordered.extend(local);
    ordered.extend(remote);
    ordered
}
