//! Freezing chain definitions onto runs, and rehydrating them
//!
//! A run executes against an immutable snapshot of its chain's nodes taken
//! at run start, so later edits to the chain never alter an in-flight or
//! historical run.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::entity::{Chain, ChainNode, MessageSpec};
use super::repository::ChainRepository;
use crate::domain::credentials::{CredentialRepository, ProviderCredential};
use crate::domain::error::EngineError;
use crate::domain::run::{Run, RunRepository};
use crate::domain::schema::SchemaNode;

/// A frozen node definition: every field the engine needs and nothing else
///
/// Deliberately excludes timestamps and storage-only metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: Uuid,
    pub name: String,
    pub order_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<Uuid>,
    pub model: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub model_params: Map<String, Value>,
    #[serde(default)]
    pub messages_config: Vec<MessageSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_definition: Option<String>,
    #[serde(default)]
    pub stop_on_validation_error: bool,
}

impl NodeSnapshot {
    /// Freeze a live node
    pub fn from_node(node: &ChainNode) -> Self {
        Self {
            id: node.id(),
            name: node.name().to_string(),
            order_index: node.order_index(),
            credential_id: node.credential_id(),
            model: node.model().to_string(),
            model_params: node.model_params().clone(),
            messages_config: node.messages_config().to_vec(),
            output_schema: node.output_schema().cloned(),
            schema_definition: node.schema_definition().map(str::to_string),
            stop_on_validation_error: node.stop_on_validation_error(),
        }
    }
}

/// A rehydrated snapshot node with its provider credential attached
#[derive(Debug, Clone)]
pub struct ResolvedNode {
    pub snapshot: NodeSnapshot,
    pub credential: Option<ProviderCredential>,
}

/// Loads the frozen node list for a run, creating and persisting the
/// snapshot on first use.
#[derive(Debug)]
pub struct ChainSnapshotLoader {
    chains: Arc<dyn ChainRepository>,
    credentials: Arc<dyn CredentialRepository>,
    runs: Arc<dyn RunRepository>,
}

impl ChainSnapshotLoader {
    pub fn new(
        chains: Arc<dyn ChainRepository>,
        credentials: Arc<dyn CredentialRepository>,
        runs: Arc<dyn RunRepository>,
    ) -> Self {
        Self {
            chains,
            credentials,
            runs,
        }
    }

    /// Freeze a chain's nodes into snapshot records, ordered by index
    pub fn create_snapshot(chain: &Chain) -> Vec<NodeSnapshot> {
        let mut nodes: Vec<&ChainNode> = chain.nodes().iter().collect();
        nodes.sort_by_key(|n| n.order_index());

        nodes.into_iter().map(NodeSnapshot::from_node).collect()
    }

    /// Resolve the node list for a run
    ///
    /// A run that already carries a snapshot reuses it verbatim; it is
    /// never regenerated from the live chain, so reruns of a historical
    /// run see the exact frozen definition even if the chain was edited
    /// or deleted. A run without a snapshot gets one built from its live
    /// chain and persisted, making the run self-contained thereafter.
    pub async fn load(&self, run: &mut Run) -> Result<Vec<ResolvedNode>, EngineError> {
        if run.chain_snapshot().is_empty() {
            let chain_id = run.chain_id().ok_or_else(|| {
                EngineError::validation("Run has neither a chain snapshot nor a chain reference")
            })?;

            let chain = self
                .chains
                .get(chain_id)
                .await?
                .ok_or_else(|| EngineError::not_found(format!("Chain {chain_id}")))?;

            let snapshot = Self::create_snapshot(&chain);

            debug!(
                run_id = %run.id(),
                chain_id = %chain_id,
                nodes = snapshot.len(),
                "Created chain snapshot for run"
            );

            run.set_chain_snapshot(snapshot);
            self.runs.update_run(run.clone()).await?;
        }

        let mut snapshots = run.chain_snapshot().to_vec();
        snapshots.sort_by_key(|n| n.order_index);

        let credentials = self.fetch_credentials(&snapshots).await?;

        Ok(snapshots
            .into_iter()
            .map(|snapshot| {
                let credential = snapshot
                    .credential_id
                    .and_then(|id| credentials.get(&id).cloned());

                ResolvedNode {
                    snapshot,
                    credential,
                }
            })
            .collect())
    }

    /// Batch-fetch the distinct credentials referenced by the snapshot
    async fn fetch_credentials(
        &self,
        snapshots: &[NodeSnapshot],
    ) -> Result<HashMap<Uuid, ProviderCredential>, EngineError> {
        let mut ids: Vec<Uuid> = Vec::new();

        for snapshot in snapshots {
            if let Some(id) = snapshot.credential_id {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let credentials = self.credentials.find_by_ids(&ids).await?;

        Ok(credentials.into_iter().map(|c| (c.id(), c)).collect())
    }
}
