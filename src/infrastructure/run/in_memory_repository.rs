//! In-memory run repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::error::EngineError;
use crate::domain::run::{Run, RunRepository, RunStep};

/// In-memory implementation of RunRepository
///
/// Steps are stored in append order per run, which is their execution
/// order.
#[derive(Debug, Default)]
pub struct InMemoryRunRepository {
    runs: Arc<RwLock<HashMap<Uuid, Run>>>,
    steps: Arc<RwLock<HashMap<Uuid, Vec<RunStep>>>>,
}

impl InMemoryRunRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn create_run(&self, run: Run) -> Result<Run, EngineError> {
        let mut runs = self.runs.write().await;

        if runs.contains_key(&run.id()) {
            return Err(EngineError::storage(format!(
                "Run '{}' already exists",
                run.id()
            )));
        }

        runs.insert(run.id(), run.clone());
        Ok(run)
    }

    async fn update_run(&self, run: Run) -> Result<Run, EngineError> {
        let mut runs = self.runs.write().await;

        if !runs.contains_key(&run.id()) {
            return Err(EngineError::not_found(format!("Run {}", run.id())));
        }

        runs.insert(run.id(), run.clone());
        Ok(run)
    }

    async fn get_run(&self, id: Uuid) -> Result<Option<Run>, EngineError> {
        let runs = self.runs.read().await;
        Ok(runs.get(&id).cloned())
    }

    async fn append_step(&self, step: RunStep) -> Result<RunStep, EngineError> {
        let mut steps = self.steps.write().await;
        steps.entry(step.run_id).or_default().push(step.clone());
        Ok(step)
    }

    async fn steps_for_run(&self, run_id: Uuid) -> Result<Vec<RunStep>, EngineError> {
        let steps = self.steps.read().await;
        Ok(steps.get(&run_id).cloned().unwrap_or_default())
    }
}
