use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Delay before a debounced operation fires.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

struct Pending {
    id: u64,
    handle: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<HashMap<String, Pending>>>;

fn lock(map: &PendingMap) -> MutexGuard<'_, HashMap<String, Pending>> {
    map.lock().unwrap_or_else(|e| e.into_inner())
}

/// Trailing-edge debouncer keyed by operation name.
///
/// At most one timer is pending per key; a new call replaces the old one.
/// Dropping the debouncer aborts every pending timer.
pub struct Debouncer {
    delay: Duration,
    pending: PendingMap,
    next_id: AtomicU64,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `f` to run after the delay unless `key` is debounced again first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn debounce<F, Fut>(&self, key: &str, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let delay = self.delay;
        let pending = Arc::clone(&self.pending);
        let task_key = key.to_string();

        // Hold the lock across spawn + insert so the timer cannot fire before it is registered.
        let mut map = lock(&self.pending);
        if let Some(previous) = map.remove(key) {
            debug!(key, "debounce replaced pending call");
            previous.handle.abort();
        }

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut map = lock(&pending);
                // Replaced or cancelled while waiting for the lock
                if map.get(&task_key).map(|p| p.id) != Some(id) {
                    return;
                }
                map.remove(&task_key);
            }
            f().await;
        });

        map.insert(key.to_string(), Pending { id, handle });
    }

    /// Cancel the pending call for `key`. Returns true if one was pending.
    pub fn cancel(&self, key: &str) -> bool {
        match lock(&self.pending).remove(key) {
            Some(previous) => {
                previous.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, previous) in lock(&self.pending).drain() {
            previous.handle.abort();
        }
    }

    pub fn is_pending(&self, key: &str) -> bool {
        lock(&self.pending).contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
