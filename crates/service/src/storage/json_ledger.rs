use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::likes::count::clamp_value;

pub type Ledger = BTreeMap<String, u64>;

/// JSON file holding a flat `key -> count` object.
///
/// Every mutation is a whole-file read-modify-write performed under one
/// ledger-wide lock and published with an atomic rename, so concurrent
/// writers for different keys cannot lose each other's updates and readers
/// never observe a half-written file. Reads take no lock.
pub struct JsonLedger {
    file_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLedger {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), write_lock: Mutex::new(()) }
    }

    /// Load the ledger. A missing file or contents that are not a JSON
    /// object load as empty; other I/O failures are errors.
    pub async fn load(&self) -> Result<Ledger, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => Ok(parse_ledger(&bytes, &self.file_path)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Ledger::new()),
            Err(e) => Err(ServiceError::Ledger(format!("read {}: {e}", self.file_path.display()))),
        }
    }

    pub async fn get(&self, key: &str) -> Result<u64, ServiceError> {
        Ok(self.load().await?.get(key).copied().unwrap_or(0))
    }

    /// Overwrite one entry and persist; returns the stored value.
    pub async fn set(&self, key: &str, value: u64) -> Result<u64, ServiceError> {
        self.update(|ledger| {
            ledger.insert(key.to_string(), value);
            value
        })
        .await
    }

    /// Apply a mutation to the freshly loaded ledger and persist atomically.
    pub async fn update<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut Ledger) -> T,
    {
        let _guard = self.write_lock.lock().await;
        let mut ledger = self.load().await?;
        let out = f(&mut ledger);
        self.save(&ledger).await?;
        Ok(out)
    }

    async fn save(&self, ledger: &Ledger) -> Result<(), ServiceError> {
        common::env::ensure_parent_dir(&self.file_path).await?;
        let data = serde_json::to_vec_pretty(ledger)?;

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, data)
            .await
            .map_err(|e| ServiceError::Ledger(format!("write {}: {e}", tmp_path.display())))?;
        if let Err(e) = fs::rename(&tmp_path, &self.file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ServiceError::Ledger(format!("replace {}: {e}", self.file_path.display())));
        }
        debug!(path = %self.file_path.display(), entries = ledger.len(), "ledger persisted");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ledger".into());
        self.file_path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }
}

/// Entries with non-numeric values are dropped; numbers are clamped.
fn parse_ledger(bytes: &[u8], path: &Path) -> Ledger {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map
            .into_iter()
            .filter(|(_, v)| v.is_number() || v.is_string())
            .map(|(k, v)| {
                let count = clamp_value(&v);
                (k, count)
            })
            .collect(),
        Ok(_) => {
            warn!(path = %path.display(), "ledger is not a JSON object; treating as empty");
            Ledger::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ledger is not valid JSON; treating as empty");
            Ledger::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn tmp_ledger_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("json_ledger_{}", Uuid::new_v4()))
            .join("likes.json")
    }

    #[tokio::test]
    async fn missing_file_loads_empty() -> Result<(), anyhow::Error> {
        let ledger = JsonLedger::new(tmp_ledger_path());
        assert!(ledger.load().await?.is_empty());
        assert_eq!(ledger.get("a").await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn set_creates_directory_and_persists() -> Result<(), anyhow::Error> {
        let path = tmp_ledger_path();
        let ledger = JsonLedger::new(&path);
        assert_eq!(ledger.set("xyz", 1).await?, 1);

        let raw: Value = serde_json::from_slice(&fs::read(&path).await?)?;
        assert_eq!(raw, serde_json::json!({"xyz": 1}));

        // a fresh handle sees the same data
        let reloaded = JsonLedger::new(&path);
        assert_eq!(reloaded.get("xyz").await?, 1);

        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_contents_load_empty() -> Result<(), anyhow::Error> {
        let path = tmp_ledger_path();
        fs::create_dir_all(path.parent().unwrap()).await?;
        let ledger = JsonLedger::new(&path);

        for junk in ["[1,2,3]", "{not json", "42", "null", "\"text\""] {
            fs::write(&path, junk).await?;
            assert!(ledger.load().await?.is_empty(), "contents {junk}");
        }

        // a write over junk starts from an empty ledger
        fs::write(&path, "[\"a\"]").await?;
        ledger.set("b", 2).await?;
        assert_eq!(ledger.load().await?, Ledger::from([("b".to_string(), 2)]));

        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn odd_values_are_clamped_or_dropped() -> Result<(), anyhow::Error> {
        let path = tmp_ledger_path();
        fs::create_dir_all(path.parent().unwrap()).await?;
        fs::write(&path, r#"{"a": -4, "b": 2.6, "c": "7", "d": {"x": 1}, "e": [1], "f": null}"#).await?;

        let ledger = JsonLedger::new(&path).load().await?;
        assert_eq!(
            ledger,
            Ledger::from([("a".to_string(), 0), ("b".to_string(), 3), ("c".to_string(), 7)])
        );

        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_updates_across_keys_are_not_lost() -> Result<(), anyhow::Error> {
        let path = tmp_ledger_path();
        let ledger = Arc::new(JsonLedger::new(&path));

        let mut handles = Vec::new();
        for i in 0..20 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("k{}", i % 4);
                ledger
                    .update(|m| {
                        let next = m.get(&key).copied().unwrap_or(0) + 1;
                        m.insert(key, next);
                    })
                    .await
            }));
        }
        for h in handles {
            h.await??;
        }

        let loaded = ledger.load().await?;
        assert_eq!(loaded.len(), 4);
        assert!(loaded.values().all(|v| *v == 5));

        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }
}
