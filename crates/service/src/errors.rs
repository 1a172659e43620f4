use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("remote store error: {0}")]
    Remote(String),
    #[error("ledger error: {0}")]
    Ledger(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }
}

impl From<common::CoreError> for ServiceError {
    fn from(e: common::CoreError) -> Self { Self::Ledger(e.to_string()) }
}
