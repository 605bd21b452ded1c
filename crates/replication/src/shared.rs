//! Thread-safe handle over one policy instance.
//!
//! Responses for different in-flight requests may arrive on different threads
//! at the same time, while the policy's queue and ledger are plain mutable
//! state. `SharedPolicy` makes the instance a single critical section: every
//! call takes one `parking_lot::Mutex` for the duration of one in-memory
//! decision. It also owns the in-flight set, so admission and dequeue happen
//! under the same lock and two callbacks can never both claim the last slot.

use crate::error::Result;
use crate::policy::{OperationPolicy, OperationStatus};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

struct Dispatch<P: OperationPolicy> {
    policy: P,
    in_flight: HashSet<P::Replica>,
}

/// Cloneable, lock-protected policy plus the set of outstanding requests.
pub struct SharedPolicy<P: OperationPolicy> {
    inner: Arc<Mutex<Dispatch<P>>>,
}

impl<P: OperationPolicy> Clone for SharedPolicy<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: OperationPolicy> fmt::Debug for SharedPolicy<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("SharedPolicy")
            .field("policy", &state.policy.name())
            .field("in_flight", &state.in_flight.len())
            .field("status", &state.policy.status())
            .finish()
    }
}

impl<P: OperationPolicy> SharedPolicy<P> {
    pub fn new(policy: P) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Dispatch {
                policy,
                in_flight: HashSet::new(),
            })),
        }
    }

    /// Admit and dequeue the next replica if the policy wants another request
    /// in flight. Returns `Ok(None)` when no request should be sent now.
    pub fn try_dispatch(&self) -> Result<Option<P::Replica>> {
        let mut state = self.inner.lock();
        if !state.policy.should_send_more(&state.in_flight) {
            return Ok(None);
        }
        let replica = state.policy.next_replica()?;
        state.in_flight.insert(replica.clone());
        trace!(
            policy = state.policy.name(),
            ?replica,
            in_flight = state.in_flight.len(),
            "dispatched"
        );
        Ok(Some(replica))
    }

    /// Dispatch until the policy stops admitting requests.
    pub fn dispatch_all(&self) -> Result<Vec<P::Replica>> {
        let mut state = self.inner.lock();
        let mut dispatched = Vec::new();
        while state.policy.should_send_more(&state.in_flight) {
            let replica = state.policy.next_replica()?;
            state.in_flight.insert(replica.clone());
            dispatched.push(replica);
        }
        Ok(dispatched)
    }

    /// Record a successful response and return the resulting status.
    pub fn on_success(&self, replica: &P::Replica) -> Result<OperationStatus> {
        let mut state = self.inner.lock();
        state.policy.on_success(replica)?;
        state.in_flight.remove(replica);
        Ok(state.policy.status())
    }

    /// Record a failed request and return the resulting status.
    pub fn on_failure(&self, replica: &P::Replica) -> Result<OperationStatus> {
        let mut state = self.inner.lock();
        state.policy.on_failure(replica)?;
        state.in_flight.remove(replica);
        Ok(state.policy.status())
    }

    pub fn status(&self) -> OperationStatus {
        self.inner.lock().policy.status()
    }

    pub fn is_complete(&self) -> bool {
        self.inner.lock().policy.is_complete()
    }

    pub fn may_complete(&self) -> bool {
        self.inner.lock().policy.may_complete()
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.lock().in_flight.len()
    }

    pub fn replica_count(&self) -> usize {
        self.inner.lock().policy.replica_count()
    }

    pub fn name(&self) -> &'static str {
        self.inner.lock().policy.name()
    }

    /// Run `f` against the policy while holding the lock.
    ///
    /// Do not call back into this handle from `f`; the mutex is not reentrant.
    /// Read-only: dequeues and reports must go through this handle so the
    /// in-flight set stays in step with the policy.
    pub fn with_policy<T>(&self, f: impl FnOnce(&P) -> T) -> T {
        let state: MutexGuard<'_, Dispatch<P>> = self.inner.lock();
        f(&state.policy)
    }
}
