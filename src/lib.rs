//! Chainrun
//!
//! A chain-execution engine for multi-step LLM pipelines:
//! - Chains of ordered nodes, each one provider call with templated messages
//! - Immutable per-run chain snapshots for reproducibility
//! - Variable resolution from run input, previous steps, and constants
//! - A schema definition language with recursive response validation
//! - Prompt template versions resolved in one batch per run

pub mod domain;
pub mod infrastructure;

pub use domain::{
    Chain, ChainNode, ChainRepository, ChainSnapshotLoader, CredentialRepository, EngineError,
    LlmClient, Message, MessageRole, NodeSnapshot, PromptVersion, PromptVersionRepository,
    PromptVersionResolver, ProviderCallResponse, ProviderCredential, Run, RunExecutor,
    RunRepository, RunStatus, RunStep, SchemaNode,
};
