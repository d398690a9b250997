//! Top-level run execution
//!
//! Drives a run through its full lifecycle: mark running, freeze or
//! rehydrate the chain snapshot, resolve prompt versions, execute the
//! steps, and record the terminal state. A run handed to the executor
//! always leaves in `Success` or `Failed`, never stuck in `Running`.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use super::entity::Run;
use super::repository::RunRepository;
use super::step_runner::{StepRunTotals, StepRunner};
use crate::domain::chain::{ChainRepository, ChainSnapshotLoader};
use crate::domain::credentials::CredentialRepository;
use crate::domain::error::EngineError;
use crate::domain::llm::LlmClient;
use crate::domain::prompt::{PromptVersionRepository, PromptVersionResolver};

/// Executes runs end to end
#[derive(Debug)]
pub struct RunExecutor {
    runs: Arc<dyn RunRepository>,
    snapshot_loader: ChainSnapshotLoader,
    version_resolver: PromptVersionResolver,
    step_runner: StepRunner,
}

impl RunExecutor {
    pub fn new(
        client: Arc<dyn LlmClient>,
        chains: Arc<dyn ChainRepository>,
        credentials: Arc<dyn CredentialRepository>,
        prompt_versions: Arc<dyn PromptVersionRepository>,
        runs: Arc<dyn RunRepository>,
    ) -> Self {
        Self {
            runs: runs.clone(),
            snapshot_loader: ChainSnapshotLoader::new(chains, credentials, runs.clone()),
            version_resolver: PromptVersionResolver::new(prompt_versions),
            step_runner: StepRunner::new(client, runs),
        }
    }

    /// Execute a run to completion and return its terminal state
    ///
    /// Expected step-level failures end the run as `Failed` via the step
    /// totals; unexpected faults (missing chain, storage errors) are
    /// caught here and recorded as the run's fatal error. Either way the
    /// final state is persisted before returning.
    pub async fn execute(&self, mut run: Run) -> Run {
        let start = Instant::now();

        run.mark_running();

        if let Err(storage_error) = self.runs.update_run(run.clone()).await {
            error!(run_id = %run.id(), error = %storage_error, "Failed to persist running state");
            run.mark_failed(storage_error.to_string(), elapsed_ms(start));
            return run;
        }

        match self.try_execute(&mut run).await {
            Ok(totals) => {
                run.mark_finished(totals.failed, totals.tokens_in, totals.tokens_out, elapsed_ms(start));

                info!(
                    run_id = %run.id(),
                    status = ?run.status(),
                    tokens_in = totals.tokens_in,
                    tokens_out = totals.tokens_out,
                    duration_ms = run.duration_ms(),
                    "Run finished"
                );
            }
            Err(fatal) => {
                error!(run_id = %run.id(), error = %fatal, "Run execution failed");
                run.mark_failed(fatal.to_string(), elapsed_ms(start));
            }
        }

        if let Err(storage_error) = self.runs.update_run(run.clone()).await {
            error!(run_id = %run.id(), error = %storage_error, "Failed to persist final run state");
        }

        run
    }

    async fn try_execute(&self, run: &mut Run) -> Result<StepRunTotals, EngineError> {
        let nodes = self.snapshot_loader.load(run).await?;
        let versions = self.version_resolver.load_for_nodes(run.chain_snapshot()).await?;

        self.step_runner.run_steps(run, &nodes, &versions).await
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
