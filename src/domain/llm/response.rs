use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token usage reported by a provider call
///
/// Providers that do not report usage leave both sides unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallUsage {
    pub tokens_in: Option<u64>,
    pub tokens_out: Option<u64>,
}

impl CallUsage {
    pub fn new(tokens_in: u64, tokens_out: u64) -> Self {
        Self {
            tokens_in: Some(tokens_in),
            tokens_out: Some(tokens_out),
        }
    }
}

/// Response from an LLM provider call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCallResponse {
    /// Text content of the completion
    pub content: String,
    /// Token usage, when the provider reports it
    pub usage: CallUsage,
    /// Full raw provider payload
    pub raw: Value,
    /// Provider-specific metadata (request ids, model revision, ...)
    pub meta: Value,
}

impl ProviderCallResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: CallUsage::default(),
            raw: Value::Null,
            meta: Value::Null,
        }
    }

    pub fn with_usage(mut self, usage: CallUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = raw;
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }
}

/// A model advertised by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_builder() {
        let response = ProviderCallResponse::new("Hello!")
            .with_usage(CallUsage::new(10, 20))
            .with_raw(json!({"id": "cmpl-1"}));

        assert_eq!(response.content, "Hello!");
        assert_eq!(response.usage.tokens_in, Some(10));
        assert_eq!(response.usage.tokens_out, Some(20));
        assert_eq!(response.raw["id"], "cmpl-1");
        assert!(response.meta.is_null());
    }

    #[test]
    fn test_usage_defaults_unset() {
        let usage = CallUsage::default();
        assert!(usage.tokens_in.is_none());
        assert!(usage.tokens_out.is_none());
    }
}
