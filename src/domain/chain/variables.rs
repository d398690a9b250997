//! Resolution of template variables to concrete values
//!
//! Variables are resolved from the run input, a previous step's output, or
//! a constant, according to their mapping. Missing data is never an error
//! here: unresolvable variables become `Null` and render as empty strings
//! during substitution.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::entity::VariableMapping;
use crate::domain::run::StepOutput;

/// Matches a bracketed array index: `items[0]`
static BRACKET_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]").unwrap());

/// Step output members a `previous_step` path may address directly
const STEP_OUTPUT_ROOTS: [&str; 3] = ["parsed_output", "raw_output", "response_raw"];

/// Resolve a set of named template variables to concrete values
///
/// Names are deduplicated preserving first-seen order. A name with no
/// explicit mapping behaves as an `input` mapping with the name as path.
pub fn resolve_variables(
    names: &[String],
    mappings: &HashMap<String, VariableMapping>,
    input: &Value,
    step_outputs: &HashMap<String, StepOutput>,
) -> HashMap<String, Value> {
    let mut resolved = HashMap::new();
    let mut seen = HashSet::new();

    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }

        let value = match mappings.get(name) {
            Some(VariableMapping::Input { path }) => {
                let path = normalize_path(path.as_deref().unwrap_or(name));
                lookup_path(input, &path)
            }
            Some(VariableMapping::PreviousStep { step_key, path }) => {
                resolve_previous_step(step_key, path.as_deref(), step_outputs)
            }
            Some(VariableMapping::Constant { value }) => {
                value.clone().unwrap_or(Value::Null)
            }
            None => lookup_path(input, &normalize_path(name)),
        };

        resolved.insert(name.clone(), value);
    }

    resolved
}

fn resolve_previous_step(
    step_key: &str,
    path: Option<&str>,
    step_outputs: &HashMap<String, StepOutput>,
) -> Value {
    let Some(output) = step_outputs.get(step_key) else {
        return Value::Null;
    };

    let path = normalize_path(path.unwrap_or_default());

    if path.is_empty() {
        return match &output.parsed_output {
            Some(parsed) if !parsed.is_null() => parsed.clone(),
            _ => Value::String(output.raw_output.clone()),
        };
    }

    let direct = lookup_path(&output.as_value(), &path);

    if !direct.is_null() {
        return direct;
    }

    // Paths not anchored at a step output member retry rooted at the
    // parsed output, so `address.city` works as a shorthand for
    // `parsed_output.address.city`.
    let root = path.split('.').next().unwrap_or("");

    if !STEP_OUTPUT_ROOTS.contains(&root) {
        if let Some(parsed) = &output.parsed_output {
            return lookup_path(parsed, &path);
        }
    }

    Value::Null
}

/// Normalize a lookup path: bracket indices become dotted segments
/// (`items[0]` -> `items.0`) and a leading dot is stripped.
pub(crate) fn normalize_path(path: &str) -> String {
    let normalized = BRACKET_INDEX.replace_all(path, ".$1");
    normalized.trim_start_matches('.').to_string()
}

/// Dotted-path lookup into a JSON value; missing paths yield `Null`
pub(crate) fn lookup_path(value: &Value, path: &str) -> Value {
    if path.is_empty() {
        return value.clone();
    }

    let mut current = value;

    for part in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(part),
            Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };

        match next {
            Some(v) => current = v,
            None => return Value::Null,
        }
    }

    current.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn step_outputs_with(key: &str, parsed: Value) -> HashMap<String, StepOutput> {
        let mut outputs = HashMap::new();
        outputs.insert(
            key.to_string(),
            StepOutput::new(Some(parsed), "raw text", json!({"id": "resp-1"})),
        );
        outputs
    }

    #[test]
    fn test_resolve_defaults_to_input_path() {
        let resolved = resolve_variables(
            &names(&["topic"]),
            &HashMap::new(),
            &json!({"topic": "laravel"}),
            &HashMap::new(),
        );

        assert_eq!(resolved["topic"], json!("laravel"));
    }

    #[test]
    fn test_resolve_missing_input_is_null() {
        let resolved = resolve_variables(
            &names(&["missing"]),
            &HashMap::new(),
            &json!({}),
            &HashMap::new(),
        );

        assert_eq!(resolved["missing"], Value::Null);
    }

    #[test]
    fn test_resolve_explicit_input_path() {
        let mut mappings = HashMap::new();
        mappings.insert("city".to_string(), VariableMapping::input("address.city"));

        let resolved = resolve_variables(
            &names(&["city"]),
            &mappings,
            &json!({"address": {"city": "Paris"}}),
            &HashMap::new(),
        );

        assert_eq!(resolved["city"], json!("Paris"));
    }

    #[test]
    fn test_resolve_previous_step_full_path() {
        let mut mappings = HashMap::new();
        mappings.insert(
            "city".to_string(),
            VariableMapping::previous_step("first_step", "parsed_output.address.city"),
        );

        let outputs = step_outputs_with("first_step", json!({"address": {"city": "Paris"}}));

        let resolved = resolve_variables(&names(&["city"]), &mappings, &json!({}), &outputs);
        assert_eq!(resolved["city"], json!("Paris"));
    }

    #[test]
    fn test_resolve_previous_step_shorthand_path() {
        // Not anchored at parsed_output, retried against it
        let mut mappings = HashMap::new();
        mappings.insert(
            "city".to_string(),
            VariableMapping::previous_step("first_step", "address.city"),
        );

        let outputs = step_outputs_with("first_step", json!({"address": {"city": "Paris"}}));

        let resolved = resolve_variables(&names(&["city"]), &mappings, &json!({}), &outputs);
        assert_eq!(resolved["city"], json!("Paris"));
    }

    #[test]
    fn test_resolve_previous_step_anchored_path_not_retried() {
        let mut mappings = HashMap::new();
        mappings.insert(
            "x".to_string(),
            VariableMapping::previous_step("first_step", "raw_output.address"),
        );

        let outputs = step_outputs_with("first_step", json!({"raw_output": {"address": "trap"}}));

        let resolved = resolve_variables(&names(&["x"]), &mappings, &json!({}), &outputs);
        assert_eq!(resolved["x"], Value::Null);
    }

    #[test]
    fn test_resolve_previous_step_empty_path_falls_back() {
        let mut mappings = HashMap::new();
        mappings.insert(
            "out".to_string(),
            VariableMapping::PreviousStep {
                step_key: "first_step".to_string(),
                path: None,
            },
        );

        let outputs = step_outputs_with("first_step", json!({"ok": true}));
        let resolved = resolve_variables(&names(&["out"]), &mappings, &json!({}), &outputs);
        assert_eq!(resolved["out"], json!({"ok": true}));

        // Without parsed output, the raw text is used
        let mut outputs = HashMap::new();
        outputs.insert(
            "first_step".to_string(),
            StepOutput::new(None, "plain answer", Value::Null),
        );
        let resolved = resolve_variables(&names(&["out"]), &mappings, &json!({}), &outputs);
        assert_eq!(resolved["out"], json!("plain answer"));
    }

    #[test]
    fn test_resolve_previous_step_missing_step_key() {
        let mut mappings = HashMap::new();
        mappings.insert(
            "x".to_string(),
            VariableMapping::previous_step("no_such_step", "parsed_output.foo"),
        );

        let resolved = resolve_variables(&names(&["x"]), &mappings, &json!({}), &HashMap::new());
        assert_eq!(resolved["x"], Value::Null);
    }

    #[test]
    fn test_resolve_constant() {
        let mut mappings = HashMap::new();
        mappings.insert("n".to_string(), VariableMapping::constant(json!(42)));
        mappings.insert("unset".to_string(), VariableMapping::Constant { value: None });

        let resolved = resolve_variables(&names(&["n", "unset"]), &mappings, &json!({}), &HashMap::new());
        assert_eq!(resolved["n"], json!(42));
        assert_eq!(resolved["unset"], Value::Null);
    }

    #[test]
    fn test_resolve_deduplicates_names() {
        let resolved = resolve_variables(
            &names(&["topic", "topic", "topic"]),
            &HashMap::new(),
            &json!({"topic": "rust"}),
            &HashMap::new(),
        );

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved["topic"], json!("rust"));
    }

    #[test]
    fn test_normalize_path_brackets_and_leading_dot() {
        assert_eq!(normalize_path("items[0].name"), "items.0.name");
        assert_eq!(normalize_path(".a.b"), "a.b");
        assert_eq!(normalize_path("plain"), "plain");
    }

    #[test]
    fn test_lookup_path_array_index() {
        let value = json!({"items": [{"name": "first"}, {"name": "second"}]});
        assert_eq!(lookup_path(&value, "items.1.name"), json!("second"));
        assert_eq!(lookup_path(&value, "items.9.name"), Value::Null);
        assert_eq!(lookup_path(&value, ""), value);
    }
}
