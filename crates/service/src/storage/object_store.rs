use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::debug;

use configs::RemoteStoreConfig;

use crate::errors::ServiceError;

/// Headers attached to an object on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMeta {
    pub content_type: &'static str,
    pub cache_control: &'static str,
}

impl ObjectMeta {
    /// JSON body that caches and CDNs must not keep.
    pub const JSON_NO_CACHE: ObjectMeta = ObjectMeta {
        content_type: "application/json",
        cache_control: "no-store",
    };
}

/// Key -> blob store. Implementations can be an R2/S3-compatible bucket,
/// a Worker in front of one, or an in-memory map in tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object. A missing key must surface as `ServiceError::NotFound`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, ServiceError>;
    async fn put(&self, key: &str, body: Vec<u8>, meta: ObjectMeta) -> Result<(), ServiceError>;
}

/// S3-compatible bucket reached over plain HTTP GET/PUT, optionally through
/// a Worker that checks a bearer token.
pub struct HttpObjectStore {
    endpoint: String,
    bucket: String,
    bearer_token: Option<String>,
    client: Client,
}

impl HttpObjectStore {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Remote(format!("build http client: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into().trim_matches('/').to_string(),
            bearer_token: None,
            client,
        })
    }

    pub fn from_config(cfg: &RemoteStoreConfig) -> Result<Self, ServiceError> {
        Ok(Self::new(&cfg.endpoint, &cfg.bucket, Duration::from_secs(cfg.timeout_secs))?
            .with_bearer_token(cfg.token.clone()))
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn object_url(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        if self.bucket.is_empty() {
            format!("{}/{}", self.endpoint, key)
        } else {
            format!("{}/{}/{}", self.endpoint, self.bucket, key)
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, ServiceError> {
        let resp = self
            .authorize(self.client.get(self.object_url(key)))
            .send()
            .await
            .map_err(|e| ServiceError::Remote(e.to_string()))?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(ServiceError::not_found(key)),
            s if s.is_success() => {
                let bytes = resp.bytes().await.map_err(|e| ServiceError::Remote(e.to_string()))?;
                debug!(key, size = bytes.len(), "remote object fetched");
                Ok(bytes.to_vec())
            }
            s => Err(ServiceError::Remote(format!("get {key} failed: {s}"))),
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>, meta: ObjectMeta) -> Result<(), ServiceError> {
        let req = self
            .client
            .put(self.object_url(key))
            .header(header::CONTENT_TYPE, meta.content_type)
            .header(header::CACHE_CONTROL, meta.cache_control)
            .body(body);
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| ServiceError::Remote(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ServiceError::Remote(format!("put {key} failed: {}", resp.status())));
        }
        debug!(key, "remote object stored");
        Ok(())
    }
}

/// Stand-in used when no bucket is configured: every call fails, which
/// routes all likes traffic to the local ledger.
pub struct UnconfiguredObjectStore;

#[async_trait]
impl ObjectStore for UnconfiguredObjectStore {
    async fn get(&self, _key: &str) -> Result<Vec<u8>, ServiceError> {
        Err(ServiceError::Remote("remote store not configured".into()))
    }

    async fn put(&self, _key: &str, _body: Vec<u8>, _meta: ObjectMeta) -> Result<(), ServiceError> {
        Err(ServiceError::Remote("remote store not configured".into()))
    }
}
