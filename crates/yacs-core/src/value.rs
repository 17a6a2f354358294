//! Value model helpers
//!
//! Documents are plain `serde_json::Value` trees. Copies are `Clone`, so a
//! value handed out by any stage never shares structure with its source.

use serde_json::Value;

/// `$ref`: the node is a JSON Reference; sibling keys are ignored.
pub const REF_KEY: &str = "$ref";

/// `@doc`: container for processing instructions.
pub const DOC_KEY: &str = "@doc";

/// `resolve` inside `@doc`; `false` turns reference resolution off for the subtree.
pub const RESOLVE_KEY: &str = "resolve";

/// `@parent`: one parent document or an array of them.
pub const PARENT_KEY: &str = "@parent";

/// `@lock_names`: keys of this object that a child may not overwrite.
pub const LOCK_KEY: &str = "@lock_names";

/// `@schemas`: mapping of names to schemas the enclosing object must satisfy.
pub const SCHEMAS_KEY: &str = "@schemas";

/// The seven kinds a document node can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
}

impl Kind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(n) if n.is_f64() => Kind::Float,
            Value::Number(_) => Kind::Int,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Kind::Bool | Kind::Int | Kind::Float | Kind::String)
    }
}

/// Step one level into `node`: object key, or decimal index for arrays.
///
/// Array segments must be all ASCII digits; anything else, or an index past
/// the end, is a miss.
pub fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            segment.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        _ => None,
    }
}

/// Natural textual form: strings without quotes, everything else as compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// True when the node carries `"@doc": {"resolve": false}`.
///
/// Only the exact boolean `false` counts.
pub fn is_resolution_disabled(node: &Value) -> bool {
    node.get(DOC_KEY)
        .and_then(|doc| doc.get(RESOLVE_KEY))
        .map_or(false, |flag| flag == &Value::Bool(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_of_numbers() {
        assert_eq!(Kind::of(&json!(2)), Kind::Int);
        assert_eq!(Kind::of(&json!(-2)), Kind::Int);
        assert_eq!(Kind::of(&json!(2.5)), Kind::Float);
        assert_eq!(Kind::of(&json!("2")), Kind::String);
        assert_eq!(Kind::of(&Value::Null), Kind::Null);
    }

    #[test]
    fn test_child_object_and_array() {
        let doc = json!({"a": [10, 20, {"b": true}]});
        let list = child(&doc, "a").unwrap();
        assert_eq!(child(list, "1"), Some(&json!(20)));
        assert_eq!(child(child(list, "2").unwrap(), "b"), Some(&json!(true)));
        assert_eq!(child(list, "3"), None);
        assert_eq!(child(list, "-1"), None);
        assert_eq!(child(list, "+1"), None);
        assert_eq!(child(list, ""), None);
        assert_eq!(child(&json!("scalar"), "a"), None);
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&json!("2")), "2");
        assert_eq!(render(&json!(2)), "2");
        assert_eq!(render(&json!(2.1)), "2.1");
        assert_eq!(render(&Value::Null), "null");
        assert_eq!(render(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_resolution_disabled_requires_exact_false() {
        assert!(is_resolution_disabled(&json!({"@doc": {"resolve": false}})));
        assert!(!is_resolution_disabled(&json!({"@doc": {"resolve": true}})));
        assert!(!is_resolution_disabled(&json!({"@doc": {"resolve": "false"}})));
        assert!(!is_resolution_disabled(&json!({"@doc": {"resolve": 0}})));
        assert!(!is_resolution_disabled(&json!({"@doc": {}})));
        assert!(!is_resolution_disabled(&json!([{"@doc": {"resolve": false}}])));
    }
}
