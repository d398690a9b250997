//! Domain layer: entities, pure logic, and the engine's boundary traits

pub mod chain;
pub mod credentials;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod run;
pub mod schema;

pub use chain::{Chain, ChainNode, ChainRepository, ChainSnapshotLoader, NodeSnapshot};
pub use credentials::{CredentialRepository, ProviderCredential};
pub use error::EngineError;
pub use llm::{LlmClient, Message, MessageRole, ProviderCallResponse};
pub use prompt::{PromptVersion, PromptVersionRepository, PromptVersionResolver};
pub use run::{Run, RunExecutor, RunRepository, RunStatus, RunStep};
pub use schema::SchemaNode;
