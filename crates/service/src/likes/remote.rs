use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ServiceError;
use crate::storage::object_store::{ObjectMeta, ObjectStore};

use super::{article_id::ArticleId, count::clamp_value};

pub const DEFAULT_KEY_PREFIX: &str = "metrics/article-likes";

/// Body stored per article in the bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRecord {
    pub news_id: String,
    pub likes: u64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// Lenient view of a stored record; `likes` may have been written by
/// something that did not clamp it.
#[derive(Deserialize)]
struct StoredRecord {
    #[serde(default)]
    likes: Value,
}

/// Reads and writes one JSON object per article under a key prefix.
pub struct RemoteLikes {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl RemoteLikes {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_matches('/').to_string();
        Self { store, prefix }
    }

    pub fn object_key(&self, id: &ArticleId) -> String {
        format!("{}/{}.json", self.prefix, id)
    }

    /// Current count; a missing object means nobody liked the article yet.
    pub async fn read(&self, id: &ArticleId) -> Result<u64, ServiceError> {
        match self.store.get(&self.object_key(id)).await {
            Ok(bytes) => {
                let record: StoredRecord = serde_json::from_slice(&bytes)?;
                Ok(clamp_value(&record.likes))
            }
            Err(ServiceError::NotFound(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }

    pub async fn write(&self, id: &ArticleId, likes: u64) -> Result<u64, ServiceError> {
        let record = LikeRecord {
            news_id: id.to_string(),
            likes,
            updated_at: Utc::now().timestamp_millis(),
        };
        let body = serde_json::to_vec(&record)?;
        self.store.put(&self.object_key(id), body, ObjectMeta::JSON_NO_CACHE).await?;
        Ok(likes)
    }
}
