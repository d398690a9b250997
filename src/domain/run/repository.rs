//! Run persistence trait

use async_trait::async_trait;
use uuid::Uuid;

use super::entity::{Run, RunStep};
use crate::domain::error::EngineError;

/// Repository trait for run and run step persistence
///
/// The engine treats this as an append-only recorder plus key-by-id fetch;
/// steps are written exactly once per node visited and never updated.
#[async_trait]
pub trait RunRepository: Send + Sync + std::fmt::Debug {
    /// Create a new run
    async fn create_run(&self, run: Run) -> Result<Run, EngineError>;

    /// Update an existing run
    async fn update_run(&self, run: Run) -> Result<Run, EngineError>;

    /// Get a run by ID
    async fn get_run(&self, id: Uuid) -> Result<Option<Run>, EngineError>;

    /// Append an executed step record
    async fn append_step(&self, step: RunStep) -> Result<RunStep, EngineError>;

    /// List the steps recorded for a run, in execution order
    async fn steps_for_run(&self, run_id: Uuid) -> Result<Vec<RunStep>, EngineError>;
}
