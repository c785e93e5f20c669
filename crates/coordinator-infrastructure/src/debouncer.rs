//! Per-key debouncing for the file watcher: a burst of change events for the
//! same file within the coalescing window collapses into a single callback.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

/// Coalesces repeated notifications for the same key into one delayed
/// callback, restarting the delay on every new notification.
pub struct Debouncer<K>
where
    K: std::hash::Hash + Eq + Clone + Send + Sync + 'static,
{
    window: Duration,
    pending: Arc<DashMap<K, JoinHandle<()>>>,
}

impl<K> Debouncer<K>
where
    K: std::hash::Hash + Eq + Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, pending: Arc::new(DashMap::new()) }
    }

    /// Schedule `callback` to run after the debounce window elapses,
    /// cancelling any previously scheduled callback for `key`.
    pub fn notify<F>(&self, key: K, callback: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let window = self.window;
        let pending = Arc::clone(&self.pending);
        let spawn_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            callback.await;
            pending.remove(&spawn_key);
        });
        if let Some((_, previous)) = self.pending.remove(&key) {
            previous.abort();
        }
        self.pending.insert(key, handle);
    }

    /// Cancel every pending callback. No aborted callback fires after this
    /// returns.
    pub fn cancel_all(&self) {
        for entry in self.pending.iter() {
            entry.value().abort();
        }
        self.pending.clear();
    }

    /// Number of keys with a callback still pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn bursts_collapse_into_a_single_callback() {
        let debouncer = Debouncer::new(Duration::from_millis(20));
        let counter = Arc::new(AtomicU32::new(0));

        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            debouncer.notify("file.rs", async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_debounce_independently() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        let counter = Arc::new(AtomicU32::new(0));

        for key in ["a.rs", "b.rs"] {
            let counter = Arc::clone(&counter);
            debouncer.notify(key, async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancel_all_prevents_pending_callbacks_from_firing() {
        let debouncer = Debouncer::new(Duration::from_millis(30));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);
        debouncer.notify("file.rs", async move {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        debouncer.cancel_all();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(debouncer.pending_count(), 0);
    }
}
