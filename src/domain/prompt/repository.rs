//! Prompt version repository trait

use async_trait::async_trait;
use uuid::Uuid;

use super::entity::PromptVersion;
use crate::domain::error::EngineError;

/// Repository trait for prompt version lookup
#[async_trait]
pub trait PromptVersionRepository: Send + Sync + std::fmt::Debug {
    /// Batch-fetch all versions matching an explicit version id or
    /// belonging to one of the given templates, in a single query.
    async fn find_for_refs(
        &self,
        version_ids: &[Uuid],
        template_ids: &[Uuid],
    ) -> Result<Vec<PromptVersion>, EngineError>;
}
