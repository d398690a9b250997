//! Run and run step entities

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::domain::chain::NodeSnapshot;
use crate::domain::llm::Message;

/// Lifecycle status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Success,
    Failed,
}

/// Terminal status of an executed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Failed,
}

/// One execution of a chain (or of a single prompt as a one-node chain)
///
/// Mutated only by the run executor and step runner; never deleted by the
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Unique identifier
    id: Uuid,
    /// Chain this run executes, when it was started from a live chain
    #[serde(skip_serializing_if = "Option::is_none")]
    chain_id: Option<Uuid>,
    /// Input values available to `input` variable mappings
    input: Value,
    /// Frozen node definitions; written once, never mutated afterwards
    #[serde(default)]
    chain_snapshot: Vec<NodeSnapshot>,
    /// Lifecycle status
    status: RunStatus,
    /// Aggregated input tokens across steps; `None` when zero
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens_in: Option<u64>,
    /// Aggregated output tokens across steps; `None` when zero
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens_out: Option<u64>,
    /// Wall-clock duration of the run
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    /// Fatal error message, for failed runs
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Run {
    /// Create a pending run for a live chain
    pub fn for_chain(chain_id: Uuid, input: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            chain_id: Some(chain_id),
            input,
            chain_snapshot: Vec::new(),
            status: RunStatus::Pending,
            tokens_in: None,
            tokens_out: None,
            duration_ms: None,
            error: None,
            started_at: None,
            finished_at: None,
            created_at: Utc::now(),
        }
    }

    /// Create a pending run from already-frozen node definitions
    ///
    /// Used for single-prompt runs and for re-running a historical run.
    pub fn from_snapshot(snapshot: Vec<NodeSnapshot>, input: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            chain_id: None,
            input,
            chain_snapshot: snapshot,
            status: RunStatus::Pending,
            tokens_in: None,
            tokens_out: None,
            duration_ms: None,
            error: None,
            started_at: None,
            finished_at: None,
            created_at: Utc::now(),
        }
    }

    // Getters

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn chain_id(&self) -> Option<Uuid> {
        self.chain_id
    }

    pub fn input(&self) -> &Value {
        &self.input
    }

    pub fn chain_snapshot(&self) -> &[NodeSnapshot] {
        &self.chain_snapshot
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn tokens_in(&self) -> Option<u64> {
        self.tokens_in
    }

    pub fn tokens_out(&self) -> Option<u64> {
        self.tokens_out
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // State transitions

    /// Freeze node definitions onto the run; only effective once
    pub fn set_chain_snapshot(&mut self, snapshot: Vec<NodeSnapshot>) {
        if self.chain_snapshot.is_empty() {
            self.chain_snapshot = snapshot;
        }
    }

    /// Mark the run running, recording a start time if absent
    pub fn mark_running(&mut self) {
        self.status = RunStatus::Running;

        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
    }

    /// Mark the run finished, storing token totals (zero becomes `None`)
    /// and duration
    pub fn mark_finished(
        &mut self,
        failed: bool,
        tokens_in: u64,
        tokens_out: u64,
        duration_ms: u64,
    ) {
        self.status = if failed {
            RunStatus::Failed
        } else {
            RunStatus::Success
        };
        self.tokens_in = (tokens_in > 0).then_some(tokens_in);
        self.tokens_out = (tokens_out > 0).then_some(tokens_out);
        self.duration_ms = Some(duration_ms);
        self.finished_at = Some(Utc::now());
    }

    /// Mark the run failed with a fatal error message
    pub fn mark_failed(&mut self, error: impl Into<String>, duration_ms: u64) {
        self.status = RunStatus::Failed;
        self.error = Some(error.into());
        self.duration_ms = Some(duration_ms);
        self.finished_at = Some(Utc::now());
    }
}

/// Request payload recorded on a run step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRequest {
    pub model: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    pub messages: Vec<Message>,
}

/// The executed record of one node within one run; append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStep {
    pub id: Uuid,
    pub run_id: Uuid,
    pub node_id: Uuid,
    pub node_name: String,
    /// Key under which this step's output is exposed to later steps
    pub step_key: String,
    pub status: StepStatus,
    pub request: StepRequest,
    /// Full raw provider payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_raw: Option<Value>,
    /// Raw response text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
    /// Decoded response, when it decoded as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_output: Option<Value>,
    /// Validation errors and absorbed call faults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
    pub tokens_in: u64,
    pub tokens_out: u64,
    /// Call attempts made; retry policy belongs to the provider client
    pub attempts: u32,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl RunStep {
    pub fn new(
        run_id: Uuid,
        node_id: Uuid,
        node_name: impl Into<String>,
        step_key: impl Into<String>,
        request: StepRequest,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_id,
            node_id,
            node_name: node_name.into(),
            step_key: step_key.into(),
            status: StepStatus::Success,
            request,
            response_raw: None,
            raw_output: None,
            parsed_output: None,
            validation_errors: Vec::new(),
            tokens_in: 0,
            tokens_out: 0,
            attempts: 1,
            duration_ms: 0,
            created_at: Utc::now(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }
}

/// In-memory output of an executed step, exposed to later steps in the
/// same run and discarded when the run completes (the durable record is
/// the [`RunStep`]).
#[derive(Debug, Clone, Serialize)]
pub struct StepOutput {
    /// Decoded response, when it decoded as JSON
    pub parsed_output: Option<Value>,
    /// Raw response text
    pub raw_output: String,
    /// Full raw provider payload
    pub response_raw: Value,
}

impl StepOutput {
    pub fn new(parsed_output: Option<Value>, raw_output: impl Into<String>, response_raw: Value) -> Self {
        Self {
            parsed_output,
            raw_output: raw_output.into(),
            response_raw,
        }
    }

    /// The full record as a JSON value, for dotted-path lookups
    pub fn as_value(&self) -> Value {
        json!({
            "parsed_output": self.parsed_output.clone().unwrap_or(Value::Null),
            "raw_output": self.raw_output,
            "response_raw": self.response_raw,
        })
    }
}

/// Outputs of executed steps, keyed by step key
pub type StepOutputs = HashMap<String, StepOutput>;

/// Derive the step output key from a node name
///
/// Lowercases the name and collapses non-alphanumeric runs to `_`; a name
/// with no usable characters falls back to `step_<node id>`.
pub fn step_key_for(name: &str, node_id: Uuid) -> String {
    let mut key = String::new();
    let mut last_was_separator = true;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            key.extend(ch.to_lowercase());
            last_was_separator = false;
        } else if !last_was_separator {
            key.push('_');
            last_was_separator = true;
        }
    }

    let key = key.trim_end_matches('_');

    if key.is_empty() {
        format!("step_{node_id}")
    } else {
        key.to_string()
    }
}
