//! In-memory object store with failure injection, for tests.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::ServiceError;
use crate::storage::object_store::{ObjectMeta, ObjectStore};

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, (Vec<u8>, ObjectMeta)>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    latency: Duration,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call so concurrent callers interleave.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn insert_raw(&self, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .await
            .insert(key.to_string(), (body.to_vec(), ObjectMeta::JSON_NO_CACHE));
    }

    pub async fn object(&self, key: &str) -> Option<(Vec<u8>, ObjectMeta)> {
        self.objects.lock().await.get(key).cloned()
    }

    pub fn calls(&self) -> (usize, usize) {
        (self.gets.load(Ordering::SeqCst), self.puts.load(Ordering::SeqCst))
    }

    async fn pause(&self) {
        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, ServiceError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ServiceError::Remote("injected read failure".into()));
        }
        self.objects
            .lock()
            .await
            .get(key)
            .map(|(body, _)| body.clone())
            .ok_or_else(|| ServiceError::not_found(key))
    }

    async fn put(&self, key: &str, body: Vec<u8>, meta: ObjectMeta) -> Result<(), ServiceError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::Remote("injected write failure".into()));
        }
        self.objects.lock().await.insert(key.to_string(), (body, meta));
        Ok(())
    }
}
