use std::sync::Arc;

use tracing::warn;

use crate::errors::ServiceError;
use crate::storage::json_ledger::JsonLedger;

use super::article_id::ArticleId;

/// Likes kept in the local ledger file. Only consulted when the remote
/// store has failed, so reads never fail.
pub struct LocalLikes {
    ledger: Arc<JsonLedger>,
}

impl LocalLikes {
    pub fn new(ledger: Arc<JsonLedger>) -> Self {
        Self { ledger }
    }

    pub async fn read(&self, id: &ArticleId) -> u64 {
        match self.ledger.get(id.as_str()).await {
            Ok(likes) => likes,
            Err(e) => {
                warn!(news_id = %id, error = %e, "local likes ledger unreadable; reporting 0");
                0
            }
        }
    }

    pub async fn write(&self, id: &ArticleId, likes: u64) -> Result<u64, ServiceError> {
        self.ledger.set(id.as_str(), likes).await
    }

    /// Read, add one and write back as a single step under the ledger lock.
    pub async fn increment(&self, id: &ArticleId) -> Result<u64, ServiceError> {
        self.ledger
            .update(|ledger| {
                let next = ledger.get(id.as_str()).copied().unwrap_or(0).saturating_add(1);
                ledger.insert(id.to_string(), next);
                next
            })
            .await
    }
}
