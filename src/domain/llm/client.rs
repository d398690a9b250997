use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{Message, ModelInfo, ProviderCallResponse};
use crate::domain::credentials::ProviderCredential;
use crate::domain::error::EngineError;

/// Trait for LLM provider clients (OpenAI, Anthropic, etc.)
///
/// One call is one blocking completion request from the engine's
/// perspective; timeout and retry policy belong to the implementation.
#[async_trait]
pub trait LlmClient: Send + Sync + Debug {
    /// Send a chat completion request
    async fn call(
        &self,
        credential: &ProviderCredential,
        model: &str,
        messages: &[Message],
        params: &Map<String, Value>,
    ) -> Result<ProviderCallResponse, EngineError>;

    /// List the models available for a credential
    async fn list_models(
        &self,
        credential: &ProviderCredential,
    ) -> Result<Vec<ModelInfo>, EngineError>;
}
