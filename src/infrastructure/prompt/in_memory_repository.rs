//! In-memory prompt version repository implementation

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::error::EngineError;
use crate::domain::prompt::{PromptVersion, PromptVersionRepository};

/// In-memory implementation of PromptVersionRepository
///
/// Versions are immutable, so the store is a flat append-only list.
#[derive(Debug)]
pub struct InMemoryPromptVersionRepository {
    versions: Arc<RwLock<Vec<PromptVersion>>>,
}

impl InMemoryPromptVersionRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            versions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a repository pre-populated with versions
    pub fn with_versions(versions: Vec<PromptVersion>) -> Self {
        Self {
            versions: Arc::new(RwLock::new(versions)),
        }
    }

    /// Append a version
    pub async fn push(&self, version: PromptVersion) {
        self.versions.write().await.push(version);
    }
}

impl Default for InMemoryPromptVersionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptVersionRepository for InMemoryPromptVersionRepository {
    async fn find_for_refs(
        &self,
        version_ids: &[Uuid],
        template_ids: &[Uuid],
    ) -> Result<Vec<PromptVersion>, EngineError> {
        let versions = self.versions.read().await;

        Ok(versions
            .iter()
            .filter(|v| {
                version_ids.contains(&v.id()) || template_ids.contains(&v.template_id())
            })
            .cloned()
            .collect())
    }
}
