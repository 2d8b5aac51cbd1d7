//! Persisted key/value storage.
//!
//! The client keeps its session keys and failed-attempt counters in a flat
//! string-to-string store, the same shape as browser local storage. All
//! values are plain strings; counters are decimal.

mod file;
mod memory;

pub use file::{FileStorage, StorageError};
pub use memory::MemoryStorage;

use std::cell::RefCell;
use std::rc::Rc;

/// Key holding the bearer token of the current session.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Key holding the email of the logged-in user.
pub const USER_EMAIL_KEY: &str = "user_email";
/// Key holding the display name of the logged-in user.
pub const USER_NAME_KEY: &str = "user_name";

/// A flat string store.
///
/// Writes never fail from the caller's point of view; backends that can
/// fail (files) log and keep the in-memory view authoritative.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    /// All keys currently stored.
    fn keys(&self) -> Vec<String>;
}

/// A storage backend shared between the attempt tracker and the account
/// session, so both read and write one location.
///
/// The client is single-threaded, so sharing is `Rc<RefCell<_>>`.
#[derive(Debug, Default)]
pub struct SharedStorage<S> {
    inner: Rc<RefCell<S>>,
}

impl<S> SharedStorage<S> {
    pub fn new(storage: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(storage)),
        }
    }
}

impl<S> Clone for SharedStorage<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: KeyValueStorage> KeyValueStorage for SharedStorage<S> {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.inner.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) {
        self.inner.borrow_mut().remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.borrow().keys()
    }
}
