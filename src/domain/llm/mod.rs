//! LLM provider client boundary: messages, responses, and the client trait

pub mod client;
pub mod message;
pub mod response;

pub use client::LlmClient;
pub use message::{Message, MessageRole};
pub use response::{CallUsage, ModelInfo, ProviderCallResponse};
