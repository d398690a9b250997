//! In-memory credential repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::credentials::{CredentialRepository, ProviderCredential};
use crate::domain::error::EngineError;

/// In-memory implementation of CredentialRepository
#[derive(Debug)]
pub struct InMemoryCredentialRepository {
    credentials: Arc<RwLock<HashMap<Uuid, ProviderCredential>>>,
}

impl InMemoryCredentialRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            credentials: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository pre-populated with credentials
    pub fn with_credentials(credentials: Vec<ProviderCredential>) -> Self {
        let map: HashMap<Uuid, ProviderCredential> =
            credentials.into_iter().map(|c| (c.id(), c)).collect();

        Self {
            credentials: Arc::new(RwLock::new(map)),
        }
    }

    /// Insert or replace a credential
    pub async fn put(&self, credential: ProviderCredential) {
        self.credentials
            .write()
            .await
            .insert(credential.id(), credential);
    }
}

impl Default for InMemoryCredentialRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn get(&self, id: Uuid) -> Result<Option<ProviderCredential>, EngineError> {
        let credentials = self.credentials.read().await;
        Ok(credentials.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProviderCredential>, EngineError> {
        let credentials = self.credentials.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| credentials.get(id).cloned())
            .collect())
    }
}
