//! Failed-attempt tracking.
//!
//! Counts failed logins per identity and answers whether the next attempt
//! must carry a camera challenge. No I/O beyond the store.

use super::{AttemptStore, ChallengePolicy, Identity, MemoryAttemptStore};

/// Per-identity failure counters plus the policy that reads them.
#[derive(Debug, Clone)]
pub struct AttemptTracker<S: AttemptStore = MemoryAttemptStore> {
    store: S,
    policy: ChallengePolicy,
}

impl<S: AttemptStore> AttemptTracker<S> {
    pub fn new(store: S, policy: ChallengePolicy) -> Self {
        Self { store, policy }
    }

    /// Adds one failure and returns the new count.
    pub fn record_failure(&mut self, identity: &Identity) -> u32 {
        let count = self.store.load(identity).saturating_add(1);
        self.store.save(identity, count);

        if count == self.policy.threshold {
            tracing::info!(identity = %identity, count, "Challenge threshold reached");
        } else {
            tracing::debug!(identity = %identity, count, "Failed attempt recorded");
        }
        count
    }

    /// Resets the count for `identity` to zero.
    pub fn record_success(&mut self, identity: &Identity) {
        self.store.clear(identity);
        tracing::debug!(identity = %identity, "Attempt counter reset");
    }

    pub fn requires_challenge(&self, identity: &Identity) -> bool {
        self.policy.requires_challenge(self.current_count(identity))
    }

    pub fn current_count(&self, identity: &Identity) -> u32 {
        self.store.load(identity)
    }

    /// Failures left before a challenge is demanded.
    pub fn remaining_before_challenge(&self, identity: &Identity) -> u32 {
        self.policy.remaining(self.current_count(identity))
    }

    /// Clears every counter, e.g. on logout.
    pub fn reset_all(&mut self) {
        self.store.clear_all();
        tracing::info!("All attempt counters cleared");
    }

    pub fn policy(&self) -> &ChallengePolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl Default for AttemptTracker<MemoryAttemptStore> {
    fn default() -> Self {
        Self::new(MemoryAttemptStore::new(), ChallengePolicy::default())
    }
}
