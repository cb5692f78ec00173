//! Word content sources.
//!
//! Content is read-only reference data: the engine never writes it back.
//! A failed load surfaces as [`ApiError::ContentLoad`] so callers can retry
//! later; nothing is cached from a failed attempt.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{ApiError, Result};
use crate::models::WordContent;

/// Source of the vocabulary word list
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the full word list
    async fn load_words(&self) -> Result<Vec<WordContent>>;
}

/// Loads word content from a JSON file on disk.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContentSource for JsonFileSource {
    async fn load_words(&self) -> Result<Vec<WordContent>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ApiError::ContentLoad(format!("{}: {}", self.path.display(), e))
        })?;

        let words: Vec<WordContent> = serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::ContentLoad(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::debug!(path = %self.path.display(), words = words.len(), "loaded word content");
        Ok(words)
    }
}

/// Fixed in-memory word list, used by the test suite.
pub struct StaticContentSource {
    words: Vec<WordContent>,
}

impl StaticContentSource {
    pub fn new(words: Vec<WordContent>) -> Self {
        Self { words }
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    async fn load_words(&self) -> Result<Vec<WordContent>> {
        Ok(self.words.clone())
    }
}
