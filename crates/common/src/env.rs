//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

use crate::CoreError;

/// Ensure the parent directory of a data file exists.
pub async fn ensure_parent_dir(file: &Path) -> Result<(), CoreError> {
    let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::metadata(parent).await.is_ok() {
        return Ok(());
    }
    warn!(dir = %parent.display(), "data directory missing; creating it");
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| CoreError::Io(format!("cannot create {}: {e}", parent.display())))?;
    info!(dir = %parent.display(), "data directory created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parent() -> Result<(), CoreError> {
        let root = std::env::temp_dir().join(format!("common_env_{}", std::process::id()));
        let file = root.join("nested").join("ledger.json");
        ensure_parent_dir(&file).await?;
        assert!(tokio::fs::metadata(root.join("nested")).await.is_ok());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn bare_file_name_is_noop() -> Result<(), CoreError> {
        ensure_parent_dir(Path::new("ledger.json")).await
    }
}
