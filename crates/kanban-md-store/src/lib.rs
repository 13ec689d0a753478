mod local;

pub use local::LocalStore;

use std::path::Path;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// Persistence for board and detail documents, keyed by file path.
#[async_trait]
pub trait TextStore: Send + Sync {
    /// Write (create or overwrite) a document.
    async fn put(&self, path: &Path, text: &str) -> Result<(), StoreError>;

    /// Read a document. Returns `StoreError::NotFound` if absent.
    async fn get(&self, path: &Path) -> Result<String, StoreError>;

    /// Read a document, returning `None` if it does not exist.
    async fn get_opt(&self, path: &Path) -> Result<Option<String>, StoreError> {
        match self.get(path).await {
            Ok(text) => Ok(Some(text)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete a document. No-op if absent.
    async fn delete(&self, path: &Path) -> Result<(), StoreError>;

    /// Check if a document exists.
    async fn exists(&self, path: &Path) -> Result<bool, StoreError> {
        match self.get(path).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
