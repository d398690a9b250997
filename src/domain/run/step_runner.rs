//! Sequential execution of a run's snapshot nodes
//!
//! Nodes run strictly in snapshot order, one provider call in flight at a
//! time, since later steps may consume earlier steps' outputs. Expected
//! failures (provider faults, missing credentials, hard validation
//! failures) are absorbed into the step record; the loop stops after the
//! first failed step.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::entity::{
    step_key_for, Run, RunStep, StepOutput, StepOutputs, StepRequest, StepStatus,
};
use super::repository::RunRepository;
use crate::domain::chain::{build_messages, ResolvedNode};
use crate::domain::error::EngineError;
use crate::domain::llm::LlmClient;
use crate::domain::prompt::ResolvedPromptVersions;
use crate::domain::schema::parse_and_validate;

/// Aggregated outcome of a step loop
#[derive(Debug, Clone, Copy, Default)]
pub struct StepRunTotals {
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub failed: bool,
}

/// Runs each node of a run in order, recording one step per node visited
#[derive(Debug)]
pub struct StepRunner {
    client: Arc<dyn LlmClient>,
    runs: Arc<dyn RunRepository>,
}

impl StepRunner {
    pub fn new(client: Arc<dyn LlmClient>, runs: Arc<dyn RunRepository>) -> Self {
        Self { client, runs }
    }

    /// Execute the nodes sequentially, stopping after the first failed step
    pub async fn run_steps(
        &self,
        run: &Run,
        nodes: &[ResolvedNode],
        versions: &ResolvedPromptVersions,
    ) -> Result<StepRunTotals, EngineError> {
        let mut totals = StepRunTotals::default();
        let mut step_outputs: StepOutputs = HashMap::new();

        for node in nodes {
            let snapshot = &node.snapshot;
            let start = Instant::now();

            let messages = build_messages(snapshot, versions, run.input(), &step_outputs);
            let step_key = step_key_for(&snapshot.name, snapshot.id);

            let mut step = RunStep::new(
                run.id(),
                snapshot.id,
                &snapshot.name,
                &step_key,
                StepRequest {
                    model: snapshot.model.clone(),
                    params: snapshot.model_params.clone(),
                    messages: messages.clone(),
                },
            );

            match &node.credential {
                None => {
                    // Hard failure for this step; no call attempted
                    step.status = StepStatus::Failed;
                    step.validation_errors.push(format!(
                        "No provider credential configured for node '{}'",
                        snapshot.name
                    ));
                    totals.failed = true;
                }
                Some(credential) => {
                    match self
                        .client
                        .call(credential, &snapshot.model, &messages, &snapshot.model_params)
                        .await
                    {
                        Err(error) => {
                            warn!(
                                run_id = %run.id(),
                                node = %snapshot.name,
                                %error,
                                "Provider call failed"
                            );
                            step.status = StepStatus::Failed;
                            step.validation_errors.push(error.to_string());
                            totals.failed = true;
                        }
                        Ok(response) => {
                            let (parsed, errors) = parse_and_validate(
                                &response.content,
                                snapshot.output_schema.as_ref(),
                            );

                            // Soft validation: with the stop flag unset,
                            // errors are recorded but the step stays
                            // successful and the run continues.
                            if !errors.is_empty() && snapshot.stop_on_validation_error {
                                step.status = StepStatus::Failed;
                                totals.failed = true;
                            }

                            step.validation_errors = errors;
                            step.parsed_output = parsed.clone();
                            step.raw_output = Some(response.content.clone());
                            step.response_raw = Some(response.raw.clone());
                            step.tokens_in = response.usage.tokens_in.unwrap_or(0);
                            step.tokens_out = response.usage.tokens_out.unwrap_or(0);

                            totals.tokens_in += step.tokens_in;
                            totals.tokens_out += step.tokens_out;

                            step_outputs.insert(
                                step_key.clone(),
                                StepOutput::new(parsed, response.content, response.raw),
                            );
                        }
                    }
                }
            }

            step.duration_ms = start.elapsed().as_millis() as u64;

            debug!(
                run_id = %run.id(),
                node = %snapshot.name,
                step_key = %step_key,
                status = ?step.status,
                "Recorded run step"
            );

            self.runs.append_step(step).await?;

            if totals.failed {
                break;
            }
        }

        Ok(totals)
    }
}
