//! Backends for the failed-attempt counters.
//!
//! [`StorageAttemptStore`] is the canonical backend: it keeps one decimal
//! counter per identity in persisted storage so the count survives reloads.
//! [`MemoryAttemptStore`] is an alternative for ephemeral clients and tests.
//! A tracker uses exactly one of them.

use std::collections::HashMap;

use super::Identity;
use crate::storage::KeyValueStorage;

/// Storage-key prefix of a persisted counter.
pub const ATTEMPT_KEY_PREFIX: &str = "failed_attempts_";

/// Where counters live.
pub trait AttemptStore {
    /// Current count; 0 when absent.
    fn load(&self, identity: &Identity) -> u32;
    fn save(&mut self, identity: &Identity, count: u32);
    fn clear(&mut self, identity: &Identity);
    /// Removes every counter.
    fn clear_all(&mut self);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryAttemptStore {
    counts: HashMap<Identity, u32>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptStore for MemoryAttemptStore {
    fn load(&self, identity: &Identity) -> u32 {
        self.counts.get(identity).copied().unwrap_or(0)
    }

    fn save(&mut self, identity: &Identity, count: u32) {
        self.counts.insert(identity.clone(), count);
    }

    fn clear(&mut self, identity: &Identity) {
        self.counts.remove(identity);
    }

    fn clear_all(&mut self) {
        self.counts.clear();
    }
}

/// Counters persisted under `failed_attempts_<identity>`.
#[derive(Debug, Default, Clone)]
pub struct StorageAttemptStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> StorageAttemptStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn key(identity: &Identity) -> String {
        format!("{ATTEMPT_KEY_PREFIX}{identity}")
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: KeyValueStorage> AttemptStore for StorageAttemptStore<S> {
    fn load(&self, identity: &Identity) -> u32 {
        let Some(raw) = self.storage.get(&Self::key(identity)) else {
            return 0;
        };
        match raw.trim().parse() {
            Ok(count) => count,
            Err(_) => {
                tracing::warn!(
                    identity = %identity,
                    value = %raw,
                    "Unreadable attempt counter, treating as 0"
                );
                0
            }
        }
    }

    fn save(&mut self, identity: &Identity, count: u32) {
        self.storage.set(&Self::key(identity), &count.to_string());
    }

    fn clear(&mut self, identity: &Identity) {
        self.storage.remove(&Self::key(identity));
    }

    fn clear_all(&mut self) {
        for key in self.storage.keys() {
            if key.starts_with(ATTEMPT_KEY_PREFIX) {
                self.storage.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn id(raw: &str) -> Identity {
        Identity::parse(raw).unwrap()
    }

    #[test]
    fn test_storage_key_format() {
        let key = StorageAttemptStore::<MemoryStorage>::key(&id("A@x.com"));
        assert_eq!(key, "failed_attempts_a@x.com");
    }

    #[test]
    fn test_persisted_counter_is_decimal() {
        let mut store = StorageAttemptStore::new(MemoryStorage::new());
        store.save(&id("a@x.com"), 12);

        assert_eq!(
            store.storage().get("failed_attempts_a@x.com").as_deref(),
            Some("12")
        );
        assert_eq!(store.load(&id("a@x.com")), 12);
    }

    #[test]
    fn test_garbage_counter_reads_zero() {
        let mut storage = MemoryStorage::new();
        storage.set("failed_attempts_a@x.com", "three");
        let store = StorageAttemptStore::new(storage);

        assert_eq!(store.load(&id("a@x.com")), 0);
    }

    #[test]
    fn test_clear_all_keeps_other_keys() {
        let mut storage = MemoryStorage::new();
        storage.set("auth_token", "abc");
        let mut store = StorageAttemptStore::new(storage);
        store.save(&id("a@x.com"), 1);
        store.save(&id("b@x.com"), 5);

        store.clear_all();

        assert_eq!(store.load(&id("a@x.com")), 0);
        assert_eq!(store.load(&id("b@x.com")), 0);
        assert_eq!(store.storage().get("auth_token").as_deref(), Some("abc"));
    }

    #[test]
    fn test_memory_store_round() {
        let mut store = MemoryAttemptStore::new();
        assert_eq!(store.load(&id("a@x.com")), 0);
        store.save(&id("a@x.com"), 2);
        assert_eq!(store.load(&id("a@x.com")), 2);
        store.clear(&id("a@x.com"));
        assert_eq!(store.load(&id("a@x.com")), 0);
    }
}
