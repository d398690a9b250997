//! Typed schema tree for declared step output shapes

use serde::{Deserialize, Serialize};

/// A field declared on an object schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectField {
    /// Field name, unique within the owning object
    pub name: String,
    /// Whether the field must be present
    pub required: bool,
    /// Schema the field value must match
    pub schema: SchemaNode,
}

impl ObjectField {
    pub fn new(name: impl Into<String>, required: bool, schema: SchemaNode) -> Self {
        Self {
            name: name.into(),
            required,
            schema,
        }
    }
}

/// Recursive schema tree node
///
/// Every node has exactly one kind. Invalid or unknown kinds are rejected
/// at decode time by serde, so validation never has to dispatch on an
/// unrecognized type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaNode {
    String,
    Number,
    Boolean,
    Enum {
        values: Vec<String>,
    },
    Array {
        #[serde(skip_serializing_if = "Option::is_none")]
        items: Option<Box<SchemaNode>>,
    },
    Object {
        fields: Vec<ObjectField>,
    },
}

impl SchemaNode {
    /// Build an array schema with typed items
    pub fn array_of(items: SchemaNode) -> Self {
        Self::Array {
            items: Some(Box::new(items)),
        }
    }

    /// Build an enum schema from string values
    pub fn enum_of(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Build an object schema from fields
    pub fn object(fields: Vec<ObjectField>) -> Self {
        Self::Object { fields }
    }

    /// Look up a declared field on an object schema
    pub fn field(&self, name: &str) -> Option<&ObjectField> {
        match self {
            Self::Object { fields } => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }
}
