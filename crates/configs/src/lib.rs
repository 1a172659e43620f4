use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub likes: LikesConfig,
    #[serde(default)]
    pub remote: RemoteStoreConfig,
}

/// 未在 TOML 中给出的字段保持 `None`，由环境变量补全，最后落到默认值
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WORKER_THREADS: usize = 4;

/// Article likes persistence: local ledger location and remote key namespace.
#[derive(Debug, Clone, Deserialize)]
pub struct LikesConfig {
    /// Empty until normalized: TOML, then `LIKES_LEDGER_PATH`, then the default.
    #[serde(default)]
    pub ledger_path: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for LikesConfig {
    fn default() -> Self {
        Self { ledger_path: String::new(), key_prefix: default_key_prefix() }
    }
}

/// S3-compatible object store (R2 bucket or a Worker in front of it).
/// An empty endpoint means the service runs on the local ledger only.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteStoreConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self { endpoint: String::new(), bucket: String::new(), token: None, timeout_secs: default_timeout_secs() }
    }
}

fn default_ledger_path() -> String { "data/article-likes.json".into() }
fn default_key_prefix() -> String { "metrics/article-likes".into() }
fn default_timeout_secs() -> u64 { 5 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// 读取 config.toml；文件缺失时退回默认值，再由环境变量补全
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize_from_env();
        self.server.normalize()?;
        // 归一化 likes / remote（支持从环境变量填充）
        self.likes.normalize_from_env();
        self.likes.validate()?;
        self.remote.normalize_from_env();
        self.remote.validate()?;
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    pub fn normalize_from_env(&mut self) {
        // 仅填充 TOML 中缺失的字段
        if self.host.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            self.host = env_non_empty("SERVER_HOST");
        }
        if self.port.is_none() {
            self.port = env_non_empty("SERVER_PORT").and_then(|p| p.trim().parse::<u16>().ok());
        }
        if self.worker_threads.is_none() {
            self.worker_threads = env_non_empty("TOKIO_WORKER_THREADS").and_then(|v| v.trim().parse::<usize>().ok());
        }
    }

    pub fn normalize(&mut self) -> Result<()> {
        let host = self.host.as_deref().map(str::trim).unwrap_or_default();
        self.host = Some(if host.is_empty() { DEFAULT_HOST.to_string() } else { host.to_string() });
        match self.port {
            Some(0) => return Err(anyhow!("server.port 必须在 1..=65535 范围内")),
            Some(_) => {}
            None => self.port = Some(DEFAULT_PORT),
        }
        if self.worker_threads.unwrap_or(0) == 0 {
            self.worker_threads = Some(DEFAULT_WORKER_THREADS);
        }
        Ok(())
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

impl LikesConfig {
    pub fn normalize_from_env(&mut self) {
        if self.ledger_path.trim().is_empty() {
            self.ledger_path = env_non_empty("LIKES_LEDGER_PATH").unwrap_or_else(default_ledger_path);
        }
        self.key_prefix = self.key_prefix.trim().trim_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.ledger_path.trim().is_empty() {
            return Err(anyhow!("likes.ledger_path 为空"));
        }
        if self.key_prefix.is_empty() {
            return Err(anyhow!("likes.key_prefix 为空"));
        }
        Ok(())
    }
}

impl RemoteStoreConfig {
    pub fn normalize_from_env(&mut self) {
        // 若 TOML 中未提供，则尝试从环境变量填充
        if self.endpoint.trim().is_empty() {
            if let Some(endpoint) = env_non_empty("LIKES_REMOTE_ENDPOINT") {
                self.endpoint = endpoint;
            }
        }
        if self.bucket.trim().is_empty() {
            if let Some(bucket) = env_non_empty("LIKES_REMOTE_BUCKET") {
                self.bucket = bucket;
            }
        }
        if self.token.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            self.token = env_non_empty("LIKES_REMOTE_TOKEN");
        }
        self.endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        self.bucket = self.bucket.trim().trim_matches('/').to_string();
    }

    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.is_configured() {
            return Ok(());
        }
        let lower = self.endpoint.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("remote.endpoint 必须以 http:// 或 https:// 开头"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("remote.timeout_secs 必须为正整数秒"));
        }
        Ok(())
    }
}
