//! Chain repository trait

use async_trait::async_trait;
use uuid::Uuid;

use super::entity::Chain;
use crate::domain::error::EngineError;

/// Repository trait for chain lookup
///
/// Chain management (create/edit/delete) belongs to the surrounding
/// application; the engine only reads.
#[async_trait]
pub trait ChainRepository: Send + Sync + std::fmt::Debug {
    /// Get a chain by ID
    async fn get(&self, id: Uuid) -> Result<Option<Chain>, EngineError>;
}
