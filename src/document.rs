//! Shared document store.
//!
//! Documents are global, process-wide state keyed by URI; sessions reference
//! them but never own them. Each document sits behind its own mutex so that
//! an update cycle (text replace + version increment + analysis + outbound
//! queueing) is atomic with respect to other updates of the same URI, while
//! updates to different URIs proceed independently. Documents persist for the
//! life of the process; disconnects never remove them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::error::DocumentError;

/// The authoritative text of one open document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub uri: String,
    pub text: String,
    /// Increments by exactly 1 on every accepted change, starting at 0.
    pub version: i32,
}

impl Document {
    fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            text: String::new(),
            version: 0,
        }
    }

    /// Whole-document replacement; the only way text ever changes.
    pub fn apply_full_text(&mut self, text: String) {
        self.text = text;
        self.version += 1;
    }
}

/// Concurrency-safe mapping from URI to document, with per-key mutual
/// exclusion.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: RwLock<HashMap<String, Arc<Mutex<Document>>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the document if the URI is unseen (empty text, version 0);
    /// idempotent retrieval otherwise.
    pub async fn open(&self, uri: &str) -> Result<Arc<Mutex<Document>>, DocumentError> {
        if uri.is_empty() {
            return Err(DocumentError::EmptyUri);
        }
        if let Some(document) = self.documents.read().await.get(uri) {
            return Ok(document.clone());
        }
        let mut documents = self.documents.write().await;
        Ok(documents
            .entry(uri.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Document::new(uri))))
            .clone())
    }

    /// Look up a previously opened document.
    pub async fn get(&self, uri: &str) -> Option<Arc<Mutex<Document>>> {
        self.documents.read().await.get(uri).cloned()
    }

    /// Replace the full text and increment the version by 1, returning a
    /// snapshot of the updated document. Fails with
    /// [`DocumentError::Unknown`] before `open`.
    pub async fn update(
        &self,
        uri: &str,
        new_text: impl Into<String>,
    ) -> Result<Document, DocumentError> {
        let document = self
            .get(uri)
            .await
            .ok_or_else(|| DocumentError::Unknown(uri.to_string()))?;
        let mut guard = document.lock().await;
        guard.apply_full_text(new_text.into());
        Ok(guard.clone())
    }

    /// Snapshot of the current state of a document, if it exists.
    pub async fn snapshot(&self, uri: &str) -> Option<Document> {
        let document = self.get(uri).await?;
        let guard = document.lock().await;
        Some(guard.clone())
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}
