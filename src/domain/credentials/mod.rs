//! Provider credential references and their lookup boundary

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::error::EngineError;

/// A reference to a stored provider credential
///
/// The engine never sees secret material; it hands the credential to the
/// LLM client, which knows how to use it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCredential {
    /// Unique identifier
    id: Uuid,
    /// Display name
    name: String,
    /// Provider kind this credential belongs to (e.g. "openai", "anthropic")
    provider: String,
    /// Provider-specific, non-secret settings
    #[serde(default, skip_serializing_if = "Value::is_null")]
    config: Value,
}

impl ProviderCredential {
    pub fn new(id: Uuid, name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            provider: provider.into(),
            config: Value::Null,
        }
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn config(&self) -> &Value {
        &self.config
    }
}

/// Repository trait for credential lookup
#[async_trait]
pub trait CredentialRepository: Send + Sync + std::fmt::Debug {
    /// Get a credential by ID
    async fn get(&self, id: Uuid) -> Result<Option<ProviderCredential>, EngineError>;

    /// Batch-fetch credentials by ID; missing IDs are silently absent
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProviderCredential>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_accessors() {
        let id = Uuid::new_v4();
        let credential = ProviderCredential::new(id, "Prod OpenAI", "openai")
            .with_config(serde_json::json!({"org": "acme"}));

        assert_eq!(credential.id(), id);
        assert_eq!(credential.name(), "Prod OpenAI");
        assert_eq!(credential.provider(), "openai");
        assert_eq!(credential.config()["org"], "acme");
    }
}
