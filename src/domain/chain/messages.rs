//! Building the chat messages for one step
//!
//! Combines prompt content (a resolved template version or inline text)
//! with resolved variable values, substituting `{{ name }}` placeholders.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use super::entity::MessageSource;
use super::snapshot::NodeSnapshot;
use super::variables::resolve_variables;
use crate::domain::llm::Message;
use crate::domain::prompt::ResolvedPromptVersions;
use crate::domain::run::StepOutputs;

/// Matches a `{{ name }}` placeholder; names start with a letter or
/// underscore and may contain dots for nested paths.
static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}\}").unwrap());

/// Build the ordered chat messages for a node
pub fn build_messages(
    node: &NodeSnapshot,
    versions: &ResolvedPromptVersions,
    input: &Value,
    step_outputs: &StepOutputs,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(node.messages_config.len());

    for spec in &node.messages_config {
        let (content, names) = match &spec.source {
            MessageSource::Inline { inline_content } => {
                (inline_content.clone(), extract_placeholders(inline_content))
            }
            MessageSource::Template {
                prompt_template_id,
                prompt_version_id,
            } => match versions.for_message(*prompt_version_id, *prompt_template_id) {
                Some(version) => (version.content().to_string(), version.variables().to_vec()),
                None => {
                    // Recoverable: the message is sent with empty content
                    warn!(
                        node = %node.name,
                        template_id = ?prompt_template_id,
                        version_id = ?prompt_version_id,
                        "No prompt version resolved for message"
                    );
                    (String::new(), Vec::new())
                }
            },
        };

        let resolved = resolve_variables(&names, &spec.variables, input, step_outputs);

        // Single pass: placeholders without a resolved variable (possible
        // in template mode when content references an undeclared name)
        // are left untouched.
        let substituted = PLACEHOLDER_PATTERN.replace_all(&content, |captures: &regex::Captures| {
            let name = captures.get(1).unwrap().as_str();

            match resolved.get(name) {
                Some(value) => scalar_to_string(value),
                None => captures.get(0).unwrap().as_str().to_string(),
            }
        });

        messages.push(Message::new(spec.role, substituted.into_owned()));
    }

    messages
}

/// Extract placeholder names from inline content, preserving first-seen order
fn extract_placeholders(content: &str) -> Vec<String> {
    let mut names = Vec::new();

    for captures in PLACEHOLDER_PATTERN.captures_iter(content) {
        let name = captures.get(1).unwrap().as_str();

        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    names
}

/// String form used for substitution: only scalars substitute; `Null`,
/// objects and arrays render as empty strings.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::entity::{MessageSpec, VariableMapping};
    use crate::domain::llm::MessageRole;
    use crate::domain::prompt::PromptVersion;
    use crate::domain::run::StepOutput;
    use serde_json::{json, Map};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn node(messages: Vec<MessageSpec>) -> NodeSnapshot {
        NodeSnapshot {
            id: Uuid::new_v4(),
            name: "node".to_string(),
            order_index: 1,
            credential_id: None,
            model: "gpt-4o".to_string(),
            model_params: Map::new(),
            messages_config: messages,
            output_schema: None,
            schema_definition: None,
            stop_on_validation_error: false,
        }
    }

    #[test]
    fn test_inline_substitution() {
        let node = node(vec![MessageSpec::inline(
            MessageRole::User,
            "Hello {{ name }} from {{ city }}",
        )]);

        let messages = build_messages(
            &node,
            &ResolvedPromptVersions::empty(),
            &json!({"name": "Alice", "city": "Paris"}),
            &HashMap::new(),
        );

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "Hello Alice from Paris");
    }

    #[test]
    fn test_inline_repeated_placeholder() {
        let node = node(vec![MessageSpec::inline(
            MessageRole::User,
            "{{ x }} and {{ x }} again",
        )]);

        let messages = build_messages(
            &node,
            &ResolvedPromptVersions::empty(),
            &json!({"x": "twice"}),
            &HashMap::new(),
        );

        assert_eq!(messages[0].content, "twice and twice again");
    }

    #[test]
    fn test_null_and_non_scalar_render_empty() {
        let node = node(vec![MessageSpec::inline(
            MessageRole::User,
            "a={{ missing }} b={{ obj }} c={{ n }}",
        )]);

        let messages = build_messages(
            &node,
            &ResolvedPromptVersions::empty(),
            &json!({"obj": {"k": 1}, "n": 42}),
            &HashMap::new(),
        );

        assert_eq!(messages[0].content, "a= b= c=42");
    }

    #[test]
    fn test_template_content_and_declared_variables() {
        let template_id = Uuid::new_v4();
        let version = PromptVersion::new(
            Uuid::new_v4(),
            template_id,
            1,
            "Write about {{ topic }}",
        )
        .with_variables(vec!["topic".to_string()]);

        let versions = ResolvedPromptVersions::from_versions(vec![version]);

        let node = node(vec![MessageSpec::template(MessageRole::System, template_id)]);

        let messages = build_messages(&node, &versions, &json!({"topic": "laravel"}), &HashMap::new());

        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, "Write about laravel");
    }

    #[test]
    fn test_unresolved_template_yields_empty_message() {
        let node = node(vec![MessageSpec::template(MessageRole::System, Uuid::new_v4())]);

        let messages = build_messages(
            &node,
            &ResolvedPromptVersions::empty(),
            &json!({}),
            &HashMap::new(),
        );

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "");
    }

    #[test]
    fn test_previous_step_variable_in_message() {
        let node = node(vec![MessageSpec::inline(
            MessageRole::User,
            "Weather in {{ city }}?",
        )
        .with_variable(
            "city",
            VariableMapping::previous_step("first_step", "parsed_output.address.city"),
        )]);

        let mut outputs = HashMap::new();
        outputs.insert(
            "first_step".to_string(),
            StepOutput::new(Some(json!({"address": {"city": "Paris"}})), "", Value::Null),
        );

        let messages = build_messages(&node, &ResolvedPromptVersions::empty(), &json!({}), &outputs);
        assert_eq!(messages[0].content, "Weather in Paris?");
    }

    #[test]
    fn test_messages_keep_config_order() {
        let node = node(vec![
            MessageSpec::inline(MessageRole::System, "You are terse."),
            MessageSpec::inline(MessageRole::User, "Hi"),
        ]);

        let messages = build_messages(
            &node,
            &ResolvedPromptVersions::empty(),
            &json!({}),
            &HashMap::new(),
        );

        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1].role, MessageRole::User);
    }

    #[test]
    fn test_extract_placeholders_dedup_and_dotted() {
        let names = extract_placeholders("{{ a }} {{ b.c }} {{ a }} {{ _x1 }} {{ 9bad }}");
        assert_eq!(names, vec!["a", "b.c", "_x1"]);
    }
}
