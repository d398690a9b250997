//! Recursive validation of decoded JSON values against a schema tree
//!
//! Validation never fails hard: it produces a list of path-qualified,
//! human-readable error strings. An empty list means the value is valid.

use serde_json::Value;

use super::node::SchemaNode;

/// Error reported when a provider response cannot be decoded as JSON while
/// a schema is declared.
pub const INVALID_JSON_ERROR: &str = "Response is not valid JSON";

/// Path used as the root when validating a provider response.
const RESPONSE_PATH: &str = "response";

/// Validate a decoded value against a schema, reporting errors with
/// path-qualified messages rooted at `path`.
pub fn validate(value: &Value, schema: &SchemaNode, path: &str) -> Vec<String> {
    let mut errors = Vec::new();
    validate_into(value, schema, path, &mut errors);
    errors
}

/// Decode a raw provider response and validate it against an optional schema
///
/// With no schema declared, a decode failure is not an error: the parsed
/// output is simply `None`. With a schema, a decode failure yields a single
/// error entry and no parsed output; otherwise the decoded value is
/// validated recursively starting at the `response` path.
pub fn parse_and_validate(
    raw: &str,
    schema: Option<&SchemaNode>,
) -> (Option<Value>, Vec<String>) {
    let decoded = serde_json::from_str::<Value>(raw).ok();

    let Some(schema) = schema else {
        return (decoded, Vec::new());
    };

    match decoded {
        Some(value) => {
            let errors = validate(&value, schema, RESPONSE_PATH);
            (Some(value), errors)
        }
        None => (None, vec![INVALID_JSON_ERROR.to_string()]),
    }
}

fn validate_into(value: &Value, schema: &SchemaNode, path: &str, errors: &mut Vec<String>) {
    match schema {
        SchemaNode::String => {
            if !value.is_string() {
                errors.push(format!("{path} must be a string."));
            }
        }
        SchemaNode::Number => {
            if !value.is_number() {
                errors.push(format!("{path} must be a number."));
            }
        }
        SchemaNode::Boolean => {
            if !value.is_boolean() {
                errors.push(format!("{path} must be a boolean."));
            }
        }
        SchemaNode::Enum { values } => {
            let matched = value
                .as_str()
                .map(|s| values.iter().any(|v| v == s))
                .unwrap_or(false);

            if !matched {
                errors.push(format!("{path} must be one of: {}.", values.join(", ")));
            }
        }
        SchemaNode::Array { items } => match value.as_array() {
            Some(elements) => {
                if let Some(item_schema) = items {
                    for (index, element) in elements.iter().enumerate() {
                        validate_into(element, item_schema, &format!("{path}[{index}]"), errors);
                    }
                }
            }
            None => errors.push(format!("{path} must be an array.")),
        },
        SchemaNode::Object { fields } => match value.as_object() {
            Some(map) => {
                // Undeclared fields are ignored: the schema is not closed
                for field in fields {
                    let field_path = join_field(path, &field.name);

                    match map.get(&field.name) {
                        Some(field_value) => {
                            validate_into(field_value, &field.schema, &field_path, errors);
                        }
                        None if field.required => {
                            errors.push(format!("{field_path} is required."));
                        }
                        None => {}
                    }
                }
            }
            None => errors.push(format!("{path} must be an object.")),
        },
    }
}

/// Join an object field onto a base path; an empty base yields the bare name
fn join_field(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::node::ObjectField;
    use serde_json::json;

    #[test]
    fn test_validate_primitives() {
        assert!(validate(&json!("hi"), &SchemaNode::String, "response").is_empty());
        assert!(validate(&json!(3), &SchemaNode::Number, "response").is_empty());
        assert!(validate(&json!(3.5), &SchemaNode::Number, "response").is_empty());
        assert!(validate(&json!(true), &SchemaNode::Boolean, "response").is_empty());

        let errors = validate(&json!(3), &SchemaNode::String, "response");
        assert_eq!(errors, vec!["response must be a string."]);
    }

    #[test]
    fn test_validate_missing_required_field() {
        let schema = SchemaNode::object(vec![
            ObjectField::new("foo", true, SchemaNode::String),
            ObjectField::new("bar", true, SchemaNode::Number),
        ]);

        let errors = validate(&json!({"foo": "ok"}), &schema, "response");
        assert_eq!(errors, vec!["response.bar is required."]);
    }

    #[test]
    fn test_validate_optional_field_absent() {
        let schema = SchemaNode::object(vec![ObjectField::new("bar", false, SchemaNode::Number)]);

        assert!(validate(&json!({}), &schema, "response").is_empty());
    }

    #[test]
    fn test_validate_undeclared_fields_ignored() {
        let schema = SchemaNode::object(vec![ObjectField::new("foo", true, SchemaNode::String)]);

        let errors = validate(&json!({"foo": "ok", "extra": 1}), &schema, "response");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_enum() {
        let schema = SchemaNode::enum_of(["red", "green"]);

        assert!(validate(&json!("red"), &schema, "response").is_empty());

        let errors = validate(&json!("blue"), &schema, "response");
        assert_eq!(errors, vec!["response must be one of: red, green."]);

        let errors = validate(&json!(3), &schema, "response");
        assert_eq!(errors, vec!["response must be one of: red, green."]);
    }

    #[test]
    fn test_validate_array_element_paths() {
        let schema = SchemaNode::array_of(SchemaNode::Number);

        let errors = validate(&json!([1, "two", 3, "four"]), &schema, "response");
        assert_eq!(
            errors,
            vec![
                "response[1] must be a number.",
                "response[3] must be a number."
            ]
        );
    }

    #[test]
    fn test_validate_untyped_array_elements_skipped() {
        let schema = SchemaNode::Array { items: None };

        assert!(validate(&json!([1, "mixed", true]), &schema, "response").is_empty());

        let errors = validate(&json!("not-an-array"), &schema, "response");
        assert_eq!(errors, vec!["response must be an array."]);
    }

    #[test]
    fn test_validate_nested_paths() {
        let schema = SchemaNode::object(vec![ObjectField::new(
            "items",
            true,
            SchemaNode::array_of(SchemaNode::object(vec![ObjectField::new(
                "name",
                true,
                SchemaNode::String,
            )])),
        )]);

        let errors = validate(&json!({"items": [{"name": "ok"}, {}]}), &schema, "response");
        assert_eq!(errors, vec!["response.items[1].name is required."]);
    }

    #[test]
    fn test_validate_empty_base_path() {
        let schema = SchemaNode::object(vec![ObjectField::new("foo", true, SchemaNode::String)]);

        let errors = validate(&json!({}), &schema, "");
        assert_eq!(errors, vec!["foo is required."]);
    }

    #[test]
    fn test_parse_and_validate_no_schema_invalid_json() {
        let (parsed, errors) = parse_and_validate("not json at all", None);

        assert!(parsed.is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_parse_and_validate_no_schema_valid_json() {
        let (parsed, errors) = parse_and_validate(r#"{"city":"Paris"}"#, None);

        assert_eq!(parsed, Some(json!({"city":"Paris"})));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_parse_and_validate_schema_invalid_json() {
        let schema = SchemaNode::object(vec![ObjectField::new("foo", true, SchemaNode::String)]);
        let (parsed, errors) = parse_and_validate("oops", Some(&schema));

        assert!(parsed.is_none());
        assert_eq!(errors, vec![INVALID_JSON_ERROR]);
    }

    #[test]
    fn test_parse_and_validate_schema_valid_json() {
        let schema = SchemaNode::object(vec![ObjectField::new("foo", true, SchemaNode::String)]);
        let (parsed, errors) = parse_and_validate(r#"{"foo":"ok"}"#, Some(&schema));

        assert_eq!(parsed, Some(json!({"foo":"ok"})));
        assert!(errors.is_empty());

        let (parsed, errors) = parse_and_validate(r#"{"other":1}"#, Some(&schema));
        assert!(parsed.is_some());
        assert_eq!(errors, vec!["response.foo is required."]);
    }
}
