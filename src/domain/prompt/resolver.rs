//! Batch resolution of the prompt versions a run's nodes reference
//!
//! All template and version references across every message of every node
//! are collected up front and fetched in a single repository query, so a
//! run never pays one round-trip per message.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::entity::PromptVersion;
use super::repository::PromptVersionRepository;
use crate::domain::chain::{MessageSource, NodeSnapshot};
use crate::domain::error::EngineError;

/// Prompt versions resolved for one run
///
/// `by_template` holds the highest-numbered fetched version per template,
/// a run-scoped "latest" cache rather than a persisted pointer.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPromptVersions {
    by_id: HashMap<Uuid, PromptVersion>,
    by_template: HashMap<Uuid, PromptVersion>,
}

impl ResolvedPromptVersions {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_versions(versions: Vec<PromptVersion>) -> Self {
        let mut resolved = Self::default();

        for version in versions {
            let keep_as_latest = resolved
                .by_template
                .get(&version.template_id())
                .map(|existing| version.version() > existing.version())
                .unwrap_or(true);

            if keep_as_latest {
                resolved
                    .by_template
                    .insert(version.template_id(), version.clone());
            }

            resolved.by_id.insert(version.id(), version);
        }

        resolved
    }

    pub fn by_id(&self, version_id: Uuid) -> Option<&PromptVersion> {
        self.by_id.get(&version_id)
    }

    pub fn latest_for_template(&self, template_id: Uuid) -> Option<&PromptVersion> {
        self.by_template.get(&template_id)
    }

    /// The version supplying content for a message: an explicit version id
    /// wins over the template's latest.
    pub fn for_message(
        &self,
        version_id: Option<Uuid>,
        template_id: Option<Uuid>,
    ) -> Option<&PromptVersion> {
        version_id
            .and_then(|id| self.by_id(id))
            .or_else(|| template_id.and_then(|id| self.latest_for_template(id)))
    }
}

/// Resolves prompt versions for a set of nodes with one batch fetch
#[derive(Debug)]
pub struct PromptVersionResolver {
    repository: Arc<dyn PromptVersionRepository>,
}

impl PromptVersionResolver {
    pub fn new(repository: Arc<dyn PromptVersionRepository>) -> Self {
        Self { repository }
    }

    /// Collect the distinct template/version references across all message
    /// configs and fetch them in a single query.
    pub async fn load_for_nodes(
        &self,
        nodes: &[NodeSnapshot],
    ) -> Result<ResolvedPromptVersions, EngineError> {
        let mut version_ids: Vec<Uuid> = Vec::new();
        let mut template_ids: Vec<Uuid> = Vec::new();

        for node in nodes {
            for message in &node.messages_config {
                if let MessageSource::Template {
                    prompt_template_id,
                    prompt_version_id,
                } = &message.source
                {
                    if let Some(id) = prompt_version_id {
                        if !version_ids.contains(id) {
                            version_ids.push(*id);
                        }
                    }

                    if let Some(id) = prompt_template_id {
                        if !template_ids.contains(id) {
                            template_ids.push(*id);
                        }
                    }
                }
            }
        }

        if version_ids.is_empty() && template_ids.is_empty() {
            return Ok(ResolvedPromptVersions::empty());
        }

        let versions = self
            .repository
            .find_for_refs(&version_ids, &template_ids)
            .await?;

        debug!(
            versions = versions.len(),
            version_refs = version_ids.len(),
            template_refs = template_ids.len(),
            "Resolved prompt versions for run"
        );

        Ok(ResolvedPromptVersions::from_versions(versions))
    }
}
