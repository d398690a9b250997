//! Parser for the compact, interface-like schema definition language
//!
//! A definition is a single top-level object:
//!
//! ```text
//! {
//!   name: string;
//!   age?: number;
//!   color: "red" | "green";
//!   tags: string[];
//!   address: { city: string; zip?: string };
//! }
//! ```
//!
//! A `?` after a field name marks it optional; a trailing `[]` on a type
//! expression makes it an array; a `|`-separated list of string literals
//! becomes an enum.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::node::{ObjectField, SchemaNode};

/// Matches one field clause: `name: type` or `name?: type`
static FIELD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(\?)?\s*:\s*(.+?)\s*$").unwrap());

/// Matches a union of string literals: `"a" | "b" | ...`
static ENUM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^\s*"(?:[^"\\]|\\.)*"(?:\s*\|\s*"(?:[^"\\]|\\.)*")*\s*$"#).unwrap()
});

/// Schema definition syntax errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaSyntaxError {
    #[error("Schema definition must start with {{ and end with }}")]
    MissingOuterBraces,

    #[error("Invalid field clause: {clause}")]
    InvalidFieldClause { clause: String },

    #[error("Unsupported schema type expression: {expression}")]
    UnsupportedType { expression: String },
}

impl SchemaSyntaxError {
    pub fn invalid_field_clause(clause: impl Into<String>) -> Self {
        Self::InvalidFieldClause {
            clause: clause.into(),
        }
    }

    pub fn unsupported_type(expression: impl Into<String>) -> Self {
        Self::UnsupportedType {
            expression: expression.into(),
        }
    }
}

/// Parse a schema definition into a typed schema tree
///
/// `None` or blank input means no schema is enforced and yields `None`.
pub fn parse_definition(definition: Option<&str>) -> Result<Option<SchemaNode>, SchemaSyntaxError> {
    let Some(definition) = definition else {
        return Ok(None);
    };

    let trimmed = definition.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    if !trimmed.starts_with('{') || !trimmed.ends_with('}') {
        return Err(SchemaSyntaxError::MissingOuterBraces);
    }

    let body = &trimmed[1..trimmed.len() - 1];
    let fields = parse_object_fields(body)?;

    Ok(Some(SchemaNode::Object { fields }))
}

/// Parse the body of an object (the text between its braces) into fields
fn parse_object_fields(body: &str) -> Result<Vec<ObjectField>, SchemaSyntaxError> {
    let mut fields = Vec::new();

    for clause in split_top_level(body, ';') {
        let clause = clause.trim();

        if clause.is_empty() {
            continue;
        }

        let captures = FIELD_PATTERN
            .captures(clause)
            .ok_or_else(|| SchemaSyntaxError::invalid_field_clause(clause))?;

        let name = captures.get(1).unwrap().as_str();
        let required = captures.get(2).is_none();
        let type_expr = captures.get(3).unwrap().as_str();

        fields.push(ObjectField::new(name, required, parse_type_expr(type_expr)?));
    }

    Ok(fields)
}

/// Resolve a type expression, in priority order: string-literal union,
/// trailing `[]`, bare primitive, nested object.
fn parse_type_expr(expression: &str) -> Result<SchemaNode, SchemaSyntaxError> {
    let trimmed = expression.trim();

    if ENUM_PATTERN.is_match(trimmed) {
        let values = split_top_level(trimmed, '|')
            .iter()
            .map(|part| part.trim().trim_matches('"').to_string())
            .collect();

        return Ok(SchemaNode::Enum { values });
    }

    if let Some(inner) = trimmed.strip_suffix("[]") {
        return Ok(SchemaNode::array_of(parse_type_expr(inner)?));
    }

    match trimmed {
        "string" => return Ok(SchemaNode::String),
        "number" => return Ok(SchemaNode::Number),
        "boolean" => return Ok(SchemaNode::Boolean),
        _ => {}
    }

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        let fields = parse_object_fields(&trimmed[1..trimmed.len() - 1])?;
        return Ok(SchemaNode::Object { fields });
    }

    Err(SchemaSyntaxError::unsupported_type(trimmed))
}

/// Split on a separator at brace depth zero, ignoring separators inside
/// nested `{...}` or quoted strings. A `\"` inside a string does not
/// terminate it, and braces inside strings are not counted.
fn split_top_level(input: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for ch in input.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            current.push(ch);
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                current.push(ch);
            }
            '{' => {
                depth += 1;
                current.push(ch);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            c if c == separator && depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        parts.push(current);
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(definition: &str) -> SchemaNode {
        parse_definition(Some(definition)).unwrap().unwrap()
    }

    #[test]
    fn test_parse_none_and_blank() {
        assert_eq!(parse_definition(None).unwrap(), None);
        assert_eq!(parse_definition(Some("")).unwrap(), None);
        assert_eq!(parse_definition(Some("   \n ")).unwrap(), None);
    }

    #[test]
    fn test_parse_requires_outer_braces() {
        let result = parse_definition(Some("not-braces"));
        assert_eq!(result, Err(SchemaSyntaxError::MissingOuterBraces));

        let result = parse_definition(Some("{unclosed"));
        assert_eq!(result, Err(SchemaSyntaxError::MissingOuterBraces));
    }

    #[test]
    fn test_parse_primitive_fields() {
        let schema = parse("{a: string; b?: number}");

        let a = schema.field("a").unwrap();
        assert!(a.required);
        assert_eq!(a.schema, SchemaNode::String);

        let b = schema.field("b").unwrap();
        assert!(!b.required);
        assert_eq!(b.schema, SchemaNode::Number);
    }

    #[test]
    fn test_parse_boolean_and_trailing_semicolon() {
        let schema = parse("{active: boolean;}");
        assert_eq!(schema.field("active").unwrap().schema, SchemaNode::Boolean);
    }

    #[test]
    fn test_parse_enum() {
        let schema = parse(r#"{color: "red" | "green" | "blue"}"#);

        assert_eq!(
            schema.field("color").unwrap().schema,
            SchemaNode::enum_of(["red", "green", "blue"])
        );
    }

    #[test]
    fn test_parse_enum_value_containing_separators() {
        // Semicolons and pipes inside quoted values are not separators
        let schema = parse(r#"{x: "a;b" | "c|d"}"#);

        assert_eq!(
            schema.field("x").unwrap().schema,
            SchemaNode::enum_of(["a;b", "c|d"])
        );
    }

    #[test]
    fn test_parse_array() {
        let schema = parse("{tags: string[]}");

        assert_eq!(
            schema.field("tags").unwrap().schema,
            SchemaNode::array_of(SchemaNode::String)
        );
    }

    #[test]
    fn test_parse_array_of_objects() {
        let schema = parse("{items: {name: string; qty?: number}[]}");

        let SchemaNode::Array { items } = &schema.field("items").unwrap().schema else {
            panic!("expected array schema");
        };

        let item_schema = items.as_deref().unwrap();
        assert!(item_schema.field("name").unwrap().required);
        assert!(!item_schema.field("qty").unwrap().required);
    }

    #[test]
    fn test_parse_nested_object() {
        let schema = parse("{address: {city: string; zip?: string}; name: string}");

        let address = &schema.field("address").unwrap().schema;
        assert_eq!(address.field("city").unwrap().schema, SchemaNode::String);
        assert!(schema.field("name").is_some());
    }

    #[test]
    fn test_parse_invalid_clause() {
        let result = parse_definition(Some("{just-a-name}"));
        assert_eq!(
            result,
            Err(SchemaSyntaxError::invalid_field_clause("just-a-name"))
        );
    }

    #[test]
    fn test_parse_unsupported_type() {
        let result = parse_definition(Some("{id: uuid}"));
        assert_eq!(result, Err(SchemaSyntaxError::unsupported_type("uuid")));
    }

    #[test]
    fn test_parse_optional_marker_spacing() {
        let schema = parse("{ b ? : number }");
        assert!(!schema.field("b").unwrap().required);
    }

    #[test]
    fn test_split_top_level_escaped_quote() {
        let parts = split_top_level(r#""a\"b" | "c""#, '|');
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].trim(), r#""a\"b""#);
    }

    #[test]
    fn test_split_top_level_nested_braces() {
        let parts = split_top_level("a: {x: string; y: number}; b: string", ';');
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].trim(), "b: string");
    }
}
