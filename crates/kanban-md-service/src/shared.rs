use std::sync::Arc;

use kanban_md_core::{EditOp, EditOutcome};
use tokio::sync::{Mutex, MutexGuard};

use crate::{BoardDocument, ServiceError};

/// A [`BoardDocument`] shared between tasks.
///
/// Holding the lock across apply and save keeps one edit cycle in flight per
/// document; concurrent callers queue behind it.
#[derive(Clone)]
pub struct SharedDocument {
    inner: Arc<Mutex<BoardDocument>>,
}

impl SharedDocument {
    pub fn new(document: BoardDocument) -> Self {
        Self {
            inner: Arc::new(Mutex::new(document)),
        }
    }

    pub async fn apply(&self, op: EditOp) -> Result<EditOutcome, ServiceError> {
        self.inner.lock().await.apply(op).await
    }

    pub async fn reload(&self) -> Result<(), ServiceError> {
        self.inner.lock().await.reload().await
    }

    pub async fn lock(&self) -> MutexGuard<'_, BoardDocument> {
        self.inner.lock().await
    }
}
