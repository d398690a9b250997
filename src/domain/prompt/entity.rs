//! Prompt version entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable, numbered version of a prompt template
///
/// A template's "latest" version is the one with the highest version number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptVersion {
    /// Unique identifier
    id: Uuid,
    /// Template this version belongs to
    template_id: Uuid,
    /// Version number (1-indexed)
    version: u32,
    /// Prompt content, may contain `{{ name }}` placeholders
    content: String,
    /// Variable names declared on this version
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    variables: Vec<String>,
    /// When this version was created
    created_at: DateTime<Utc>,
}

impl PromptVersion {
    pub fn new(id: Uuid, template_id: Uuid, version: u32, content: impl Into<String>) -> Self {
        Self {
            id,
            template_id,
            version,
            content: content.into(),
            variables: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        self.variables = variables;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn template_id(&self) -> Uuid {
        self.template_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
