//! Runtime wiring
//!
//! Builds the likes service from configuration and makes sure its data
//! directory exists before the server starts taking traffic.

use std::{path::Path, sync::Arc};

use configs::AppConfig;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::likes::LikesService;
use crate::observability;
use crate::storage::{
    json_ledger::JsonLedger,
    object_store::{HttpObjectStore, ObjectStore, UnconfiguredObjectStore},
};

/// Ensure the ledger directory exists.
pub async fn ensure_env(cfg: &AppConfig) -> Result<(), ServiceError> {
    common::env::ensure_parent_dir(Path::new(&cfg.likes.ledger_path)).await?;
    Ok(())
}

pub fn build_object_store(cfg: &AppConfig) -> Result<Arc<dyn ObjectStore>, ServiceError> {
    if !cfg.remote.is_configured() {
        warn!("remote likes store not configured; likes are kept in the local ledger only");
        return Ok(Arc::new(UnconfiguredObjectStore));
    }
    let store = HttpObjectStore::from_config(&cfg.remote)?;
    info!(
        endpoint = %cfg.remote.endpoint,
        bucket = %cfg.remote.bucket,
        authorized = cfg.remote.token.is_some(),
        "remote likes store configured"
    );
    Ok(Arc::new(store))
}

pub fn build_likes_service(cfg: &AppConfig) -> Result<Arc<LikesService>, ServiceError> {
    observability::init_metrics();
    let store = build_object_store(cfg)?;
    let ledger = Arc::new(JsonLedger::new(&cfg.likes.ledger_path));
    info!(ledger = %cfg.likes.ledger_path, prefix = %cfg.likes.key_prefix, "likes service ready");
    Ok(Arc::new(LikesService::new(store, cfg.likes.key_prefix.clone(), ledger)))
}
