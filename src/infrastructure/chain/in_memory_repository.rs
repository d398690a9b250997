//! In-memory chain repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::chain::{Chain, ChainRepository};
use crate::domain::error::EngineError;

/// In-memory implementation of ChainRepository
#[derive(Debug)]
pub struct InMemoryChainRepository {
    chains: Arc<RwLock<HashMap<Uuid, Chain>>>,
}

impl InMemoryChainRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            chains: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository pre-populated with chains
    pub fn with_chains(chains: Vec<Chain>) -> Self {
        let map: HashMap<Uuid, Chain> = chains.into_iter().map(|c| (c.id(), c)).collect();

        Self {
            chains: Arc::new(RwLock::new(map)),
        }
    }

    /// Insert or replace a chain
    pub async fn put(&self, chain: Chain) {
        self.chains.write().await.insert(chain.id(), chain);
    }

    /// Remove a chain; returns whether it existed
    pub async fn remove(&self, id: Uuid) -> bool {
        self.chains.write().await.remove(&id).is_some()
    }
}

impl Default for InMemoryChainRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainRepository for InMemoryChainRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Chain>, EngineError> {
        let chains = self.chains.read().await;
        Ok(chains.get(&id).cloned())
    }
}
