//! Chain and chain node entities and their message configuration types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::llm::MessageRole;
use crate::domain::schema::SchemaNode;

/// Where a template variable's value comes from
///
/// A variable with no explicit mapping behaves as `Input` with the variable
/// name as the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum VariableMapping {
    /// Dotted-path lookup into the run input
    Input {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    /// Lookup into a previous step's output
    PreviousStep {
        step_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    /// A literal value
    Constant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
}

impl VariableMapping {
    pub fn input(path: impl Into<String>) -> Self {
        Self::Input {
            path: Some(path.into()),
        }
    }

    pub fn previous_step(step_key: impl Into<String>, path: impl Into<String>) -> Self {
        Self::PreviousStep {
            step_key: step_key.into(),
            path: Some(path.into()),
        }
    }

    pub fn constant(value: Value) -> Self {
        Self::Constant { value: Some(value) }
    }
}

/// Where a message's prompt content comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MessageSource {
    /// Content supplied by a prompt template version: an explicit version
    /// id wins over the template's latest version.
    Template {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt_template_id: Option<Uuid>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt_version_id: Option<Uuid>,
    },
    /// Content written directly on the node
    Inline {
        #[serde(default)]
        inline_content: String,
    },
}

/// Configuration for one chat message of a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSpec {
    /// Message role; defaults to `user` when omitted
    #[serde(default)]
    pub role: MessageRole,

    /// Content source, tagged by `mode`
    #[serde(flatten)]
    pub source: MessageSource,

    /// Explicit variable mappings, keyed by variable name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub variables: HashMap<String, VariableMapping>,
}

impl MessageSpec {
    pub fn inline(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            source: MessageSource::Inline {
                inline_content: content.into(),
            },
            variables: HashMap::new(),
        }
    }

    pub fn template(role: MessageRole, template_id: Uuid) -> Self {
        Self {
            role,
            source: MessageSource::Template {
                prompt_template_id: Some(template_id),
                prompt_version_id: None,
            },
            variables: HashMap::new(),
        }
    }

    pub fn template_version(role: MessageRole, version_id: Uuid) -> Self {
        Self {
            role,
            source: MessageSource::Template {
                prompt_template_id: None,
                prompt_version_id: Some(version_id),
            },
            variables: HashMap::new(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, mapping: VariableMapping) -> Self {
        self.variables.insert(name.into(), mapping);
        self
    }
}

/// One pipeline step definition within a chain
///
/// Created and edited by the surrounding management layer; read-only to the
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainNode {
    /// Unique identifier
    id: Uuid,
    /// Display name; also the basis for the step output key
    name: String,
    /// 1-based position within the chain
    order_index: u32,
    /// Provider credential reference
    #[serde(skip_serializing_if = "Option::is_none")]
    credential_id: Option<Uuid>,
    /// Model name passed to the provider client
    model: String,
    /// Free-form model parameters (temperature, max_tokens, ...)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    model_params: Map<String, Value>,
    /// Ordered message configurations
    messages_config: Vec<MessageSpec>,
    /// Parsed output schema, if one is declared
    #[serde(skip_serializing_if = "Option::is_none")]
    output_schema: Option<SchemaNode>,
    /// Original textual schema definition, stored alongside the parsed form
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_definition: Option<String>,
    /// Whether validation errors fail the step and stop the run
    #[serde(default)]
    stop_on_validation_error: bool,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl ChainNode {
    pub fn new(id: Uuid, name: impl Into<String>, order_index: u32, model: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            order_index,
            credential_id: None,
            model: model.into(),
            model_params: Map::new(),
            messages_config: Vec::new(),
            output_schema: None,
            schema_definition: None,
            stop_on_validation_error: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_credential(mut self, credential_id: Uuid) -> Self {
        self.credential_id = Some(credential_id);
        self
    }

    pub fn with_model_params(mut self, params: Map<String, Value>) -> Self {
        self.model_params = params;
        self
    }

    pub fn with_message(mut self, message: MessageSpec) -> Self {
        self.messages_config.push(message);
        self
    }

    pub fn with_schema(mut self, schema: SchemaNode, definition: impl Into<String>) -> Self {
        self.output_schema = Some(schema);
        self.schema_definition = Some(definition.into());
        self
    }

    pub fn with_stop_on_validation_error(mut self, stop: bool) -> Self {
        self.stop_on_validation_error = stop;
        self
    }

    // Getters

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order_index(&self) -> u32 {
        self.order_index
    }

    pub fn credential_id(&self) -> Option<Uuid> {
        self.credential_id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn model_params(&self) -> &Map<String, Value> {
        &self.model_params
    }

    pub fn messages_config(&self) -> &[MessageSpec] {
        &self.messages_config
    }

    pub fn output_schema(&self) -> Option<&SchemaNode> {
        self.output_schema.as_ref()
    }

    pub fn schema_definition(&self) -> Option<&str> {
        self.schema_definition.as_deref()
    }

    pub fn stop_on_validation_error(&self) -> bool {
        self.stop_on_validation_error
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// An ordered pipeline of LLM invocation steps belonging to one project
///
/// Node order is a dense 1-based sequence maintained by the management
/// layer, not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    /// Unique identifier
    id: Uuid,
    /// Owning project
    project_id: Uuid,
    /// Display name
    name: String,
    /// Step definitions
    nodes: Vec<ChainNode>,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Chain {
    pub fn new(id: Uuid, project_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            project_id,
            name: name.into(),
            nodes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_node(mut self, node: ChainNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[ChainNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
