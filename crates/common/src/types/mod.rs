use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Success body shared by the likes endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LikesEnvelope {
    pub success: bool,
    pub news_id: String,
    pub likes: u64,
}

impl LikesEnvelope {
    pub fn ok(news_id: String, likes: u64) -> Self {
        Self { success: true, news_id, likes }
    }
}

/// Failure body: `{ "success": false, "error": "..." }`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self { success: false, error: error.into() }
    }
}
