//! Article identifiers as used in storage keys.
//!
//! Raw ids come straight from request paths, so everything outside
//! `[A-Za-z0-9_-]` is stripped before an id may address any storage.

use std::fmt;

use serde::Serialize;

use crate::errors::ServiceError;

/// Strip every character outside `[A-Za-z0-9_-]`.
///
/// Deterministic and idempotent. An empty result is the rejection marker.
pub fn sanitize_article_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// A sanitized, non-empty article id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let id = sanitize_article_id(raw);
        if id.is_empty() {
            return Err(ServiceError::Validation("invalid news id".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArticleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
