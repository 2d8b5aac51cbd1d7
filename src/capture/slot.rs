//! Latest-frame mailbox between a capture thread and the session task.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Pause between checks while waiting for the first frame.
pub(crate) const READY_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Holds the most recent value written by a producer thread.
#[derive(Debug)]
pub(crate) struct FrameSlot<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for FrameSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> FrameSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Replaces the held value.
    pub(crate) fn put(&self, value: T) {
        *self.lock() = Some(value);
    }

    pub(crate) fn clear(&self) {
        *self.lock() = None;
    }

    pub(crate) fn is_filled(&self) -> bool {
        self.lock().is_some()
    }

    pub(crate) fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.lock().clone()
    }

    /// Resolves once a value is present. Sleeps on the runtime between
    /// checks, so an enclosing timeout or cancellation always gets a turn.
    pub(crate) async fn filled(&self, interval: Duration) {
        while !self.is_filled() {
            tokio::time::sleep(interval).await;
        }
    }

    // A panicking producer cannot leave a torn `Option`.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_empty_slot_lets_timeout_fire() {
        let slot = FrameSlot::<Vec<u8>>::new();

        let waited =
            tokio::time::timeout(Duration::from_secs(5), slot.filled(READY_POLL_INTERVAL)).await;

        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_filled_resolves_after_late_frame() {
        let slot = FrameSlot::new();
        let producer = slot.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            producer.put(vec![1u8, 2, 3]);
        });

        let waited =
            tokio::time::timeout(Duration::from_secs(5), slot.filled(READY_POLL_INTERVAL)).await;

        assert!(waited.is_ok());
        assert_eq!(slot.latest(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_latest_from_other_thread() {
        let slot = FrameSlot::new();
        let producer = slot.clone();
        std::thread::spawn(move || {
            producer.put(1u32);
            producer.put(2u32);
        })
        .join()
        .unwrap();

        assert_eq!(slot.latest(), Some(2));
        slot.clear();
        assert!(!slot.is_filled());
    }
}
