use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::ServiceError;
use crate::observability::{
    LIKES_FALLBACK_READS_TOTAL, LIKES_FALLBACK_WRITES_TOTAL, LIKES_INCREMENTS_TOTAL, LIKES_REMOTE_FAILURES_TOTAL,
};
use crate::storage::{json_ledger::JsonLedger, object_store::ObjectStore};

use super::{
    article_id::ArticleId, count::clamp_likes, keyed_queue::KeyedQueue, local::LocalLikes, remote::RemoteLikes,
};

/// Which store answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Remote,
    Local,
}

/// A count together with the store that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counted {
    pub likes: u64,
    pub backend: Backend,
}

/// Outcome of the remote attempt: either final, or the operation moves to
/// the local ledger.
#[derive(Debug)]
pub enum Transition<T> {
    Settled(T),
    FallBack(ServiceError),
}

pub fn after_remote<T>(outcome: Result<T, ServiceError>) -> Transition<T> {
    match outcome {
        Ok(value) => Transition::Settled(value),
        Err(e) => Transition::FallBack(e),
    }
}

/// Entry point for the likes endpoints.
///
/// Reads go remote first and quietly fall back to the ledger. Mutations for
/// one article are serialized through a [`KeyedQueue`]; each tries the remote
/// read-modify-write once and, on any remote failure, repeats it against the
/// ledger. Only a ledger failure reaches the caller.
pub struct LikesService {
    remote: RemoteLikes,
    local: LocalLikes,
    queue: KeyedQueue<ArticleId>,
}

impl LikesService {
    pub fn new(store: Arc<dyn ObjectStore>, key_prefix: impl Into<String>, ledger: Arc<JsonLedger>) -> Self {
        Self {
            remote: RemoteLikes::new(store, key_prefix),
            local: LocalLikes::new(ledger),
            queue: KeyedQueue::new(),
        }
    }

    pub async fn get_likes(&self, id: &ArticleId) -> Counted {
        match after_remote(self.remote.read(id).await) {
            Transition::Settled(likes) => Counted { likes, backend: Backend::Remote },
            Transition::FallBack(e) => {
                LIKES_REMOTE_FAILURES_TOTAL.inc();
                LIKES_FALLBACK_READS_TOTAL.inc();
                warn!(news_id = %id, error = %e, "remote likes read failed; using local ledger");
                Counted { likes: self.local.read(id).await, backend: Backend::Local }
            }
        }
    }

    pub async fn increment_likes(&self, id: &ArticleId) -> Result<Counted, ServiceError> {
        let counted = self
            .queue
            .run_exclusive(id, || async move {
                match after_remote(self.remote_increment(id).await) {
                    Transition::Settled(likes) => Ok::<_, ServiceError>(Counted { likes, backend: Backend::Remote }),
                    Transition::FallBack(e) => {
                        self.note_fallback(id, &e);
                        let likes = self.local.increment(id).await?;
                        Ok(Counted { likes, backend: Backend::Local })
                    }
                }
            })
            .await?;
        LIKES_INCREMENTS_TOTAL.inc();
        debug!(news_id = %id, likes = counted.likes, backend = ?counted.backend, "like recorded");
        Ok(counted)
    }

    /// Overwrite an article's count. `raw` is clamped before it is stored.
    pub async fn set_likes(&self, id: &ArticleId, raw: f64) -> Result<Counted, ServiceError> {
        let likes = clamp_likes(raw);
        let counted = self
            .queue
            .run_exclusive(id, || async move {
                match after_remote(self.remote.write(id, likes).await) {
                    Transition::Settled(likes) => Ok::<_, ServiceError>(Counted { likes, backend: Backend::Remote }),
                    Transition::FallBack(e) => {
                        self.note_fallback(id, &e);
                        let likes = self.local.write(id, likes).await?;
                        Ok(Counted { likes, backend: Backend::Local })
                    }
                }
            })
            .await?;
        info!(news_id = %id, likes = counted.likes, backend = ?counted.backend, "likes overwritten");
        Ok(counted)
    }

    async fn remote_increment(&self, id: &ArticleId) -> Result<u64, ServiceError> {
        let current = self.remote.read(id).await?;
        self.remote.write(id, current.saturating_add(1)).await
    }

    fn note_fallback(&self, id: &ArticleId, e: &ServiceError) {
        LIKES_REMOTE_FAILURES_TOTAL.inc();
        LIKES_FALLBACK_WRITES_TOTAL.inc();
        warn!(news_id = %id, error = %e, "remote likes write path failed; using local ledger");
    }

    /// Articles with a mutation currently running or queued.
    pub fn in_flight(&self) -> usize {
        self.queue.pending()
    }
}
