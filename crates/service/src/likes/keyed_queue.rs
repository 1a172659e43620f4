//! Per-key mutual exclusion for read-modify-write sequences.
//!
//! Tasks for the same key run one at a time in arrival order; tasks for
//! different keys never wait on each other.

use std::{future::Future, hash::Hash, sync::Arc};

use dashmap::DashMap;
use tokio::sync::Mutex;

type Slot = Arc<Mutex<()>>;

pub struct KeyedQueue<K: Eq + Hash> {
    slots: DashMap<K, Slot>,
}

impl<K: Eq + Hash + Clone> KeyedQueue<K> {
    pub fn new() -> Self {
        Self { slots: DashMap::new() }
    }

    /// Run `task` once every earlier task for `key` has finished.
    ///
    /// A failed or cancelled task releases its turn like a successful one.
    pub async fn run_exclusive<F, Fut, T>(&self, key: &K, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let slot = self
            .slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let _release = Release { slots: &self.slots, key, slot: &slot };
        let _turn = slot.lock().await;
        task().await
    }

    /// Keys that currently have a task running or queued.
    pub fn pending(&self) -> usize {
        self.slots.len()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops the map entry once nobody else holds or awaits the slot.
struct Release<'a, K: Eq + Hash> {
    slots: &'a DashMap<K, Slot>,
    key: &'a K,
    slot: &'a Slot,
}

impl<K: Eq + Hash> Drop for Release<'_, K> {
    fn drop(&mut self) {
        // Two references left means the map's and ours. Checked under the
        // shard lock, so no waiter can clone the slot in between.
        self.slots.remove_if(self.key, |_, current| {
            Arc::ptr_eq(current, self.slot) && Arc::strong_count(current) == 2
        });
    }
}
