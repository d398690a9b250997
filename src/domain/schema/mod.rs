//! Schema definition language, typed schema tree, and response validation

pub mod node;
pub mod parser;
pub mod validator;

pub use node::{ObjectField, SchemaNode};
pub use parser::{parse_definition, SchemaSyntaxError};
pub use validator::{parse_and_validate, validate, INVALID_JSON_ERROR};
