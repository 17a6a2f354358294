//! `@schemas` handling
//!
//! An object may name schemas it must satisfy:
//!
//! ```json
//! {
//!     "@schemas": { "user": { "$ref": "../schemas/user.json" } },
//!     "username": "web"
//! }
//! ```
//!
//! After resolution each entry is a schema object. The directive is either
//! stripped, or stripped and checked through a [`Validator`].

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::value::SCHEMAS_KEY;

/// Checks an instance against a schema.
pub trait Validator: Send + Sync {
    /// `Err` carries one message per violation.
    fn validate(&self, schema: &Value, instance: &Value) -> std::result::Result<(), Vec<String>>;
}

/// JSON Schema validation through the `jsonschema` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

impl Validator for JsonSchemaValidator {
    fn validate(&self, schema: &Value, instance: &Value) -> std::result::Result<(), Vec<String>> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| vec![format!("invalid schema: {}", e)])?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{}: {}", e.instance_path, e))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Remove every `@schemas` key, at any depth.
pub fn strip_schema_references(doc: &Value) -> Value {
    match doc {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != SCHEMAS_KEY)
                .map(|(key, value)| (key.clone(), strip_schema_references(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_schema_references).collect()),
        other => other.clone(),
    }
}

/// Validate every object against the schemas it names, then strip the directives.
///
/// Each object is checked in its stripped form. All failures are collected
/// into one [`Error::Validation`], one `[i] ` prefixed line per failing schema.
pub fn validate_schemas(doc: &Value, validator: &dyn Validator) -> Result<Value> {
    let mut failures = Vec::new();
    let stripped = walk(doc, "", validator, &mut failures);

    if failures.is_empty() {
        return Ok(stripped);
    }

    let joined = failures
        .iter()
        .enumerate()
        .map(|(i, failure)| format!("[{}] {}", i, failure))
        .collect::<Vec<_>>()
        .join("\n");
    Err(Error::Validation(joined))
}

fn walk(node: &Value, path: &str, validator: &dyn Validator, failures: &mut Vec<String>) -> Value {
    match node {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map.iter().filter(|(key, _)| key.as_str() != SCHEMAS_KEY) {
                let child = format!("{}/{}", path, key);
                out.insert(key.clone(), walk(value, &child, validator, failures));
            }
            let out = Value::Object(out);

            if let Some(Value::Object(schemas)) = map.get(SCHEMAS_KEY) {
                for (name, schema) in schemas.iter().filter(|(_, schema)| schema.is_object()) {
                    match validator.validate(schema, &out) {
                        Ok(()) => debug!(path = display_path(path), schema = %name, "schema satisfied"),
                        Err(errors) => failures.push(format!(
                            "'{}' does not satisfy schema '{}': {}",
                            display_path(path),
                            name,
                            errors.join("; ")
                        )),
                    }
                }
            }
            out
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| walk(item, &format!("{}/{}", path, i), validator, failures))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_schema() -> Value {
        json!({
            "type": "object",
            "required": ["username"],
            "properties": {"username": {"type": "string"}}
        })
    }

    #[test]
    fn test_strip_at_every_depth() {
        let doc = json!({
            "@schemas": {"s": {}},
            "a": {"@schemas": {"t": {}}, "b": [{"@schemas": null, "c": 1}]}
        });
        assert_eq!(
            strip_schema_references(&doc),
            json!({"a": {"b": [{"c": 1}]}})
        );
    }

    #[test]
    fn test_valid_document_is_stripped() {
        let doc = json!({"@schemas": {"user": user_schema()}, "username": "web"});
        let out = validate_schemas(&doc, &JsonSchemaValidator).unwrap();
        assert_eq!(out, json!({"username": "web"}));
    }

    #[test]
    fn test_invalid_document_reports_each_schema() {
        let doc = json!({
            "@schemas": {"user": user_schema()},
            "nested": {
                "@schemas": {"strict": {"type": "object", "required": ["id"]}},
                "name": "x"
            }
        });
        let err = validate_schemas(&doc, &JsonSchemaValidator).unwrap_err();
        let message = err.to_string();
        let lines: Vec<&str> = message.lines().collect();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[0] '/nested'"));
        assert!(lines[1].starts_with("[1] '/'"));
        assert!(lines[1].contains("user"));
    }

    #[test]
    fn test_nested_directives_do_not_leak_into_parent_check() {
        let doc = json!({
            "@schemas": {"closed": {
                "type": "object",
                "properties": {"child": {"type": "object", "additionalProperties": false}}
            }},
            "child": {"@schemas": {}}
        });
        assert_eq!(
            validate_schemas(&doc, &JsonSchemaValidator).unwrap(),
            json!({"child": {}})
        );
    }

    #[test]
    fn test_non_object_schemas_are_ignored() {
        let doc = json!({"@schemas": {"ref": "not-a-schema", "n": 5}, "v": 1});
        assert_eq!(
            validate_schemas(&doc, &JsonSchemaValidator).unwrap(),
            json!({"v": 1})
        );
    }
}
