//! Structural diff
//!
//! Compares two documents and reports every difference as
//! `"<path> => <description>"`, where the path is `/`-separated object keys
//! and array indices (the root is the empty path). The final list is sorted
//! and free of duplicates.

use std::fmt;

use serde_json::Value;

use crate::value::{render, Kind};

/// What differs at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffKind {
    /// The two sides hold different kinds; both rendered in natural form.
    DifferentTypes { a: String, b: String },
    /// Same scalar kind, different value.
    DifferentValues(Kind),
    OnlyInA,
    OnlyInB,
    /// Arrays of different length; elements are not compared.
    DifferentArrayLength,
    /// A pairing the engine does not know how to compare.
    Unknown,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DifferentTypes { a, b } => write!(f, "different types [{}] and [{}]", a, b),
            Self::DifferentValues(kind) => write!(f, "different {} values", kind.as_str()),
            Self::OnlyInA => write!(f, "find only in A"),
            Self::OnlyInB => write!(f, "find only in B"),
            Self::DifferentArrayLength => write!(f, "different array length"),
            Self::Unknown => write!(f, "//unknown error"),
        }
    }
}

/// One difference record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    pub path: String,
    pub kind: DiffKind,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.path, self.kind)
    }
}

/// Compare `a` with `b`; the result is sorted and deduplicated.
///
/// Never fails. Identical inputs give an empty list.
pub fn diff(a: &Value, b: &Value) -> Vec<String> {
    let records = differences(a, b);
    canonicalize(records.iter().map(Difference::to_string).collect())
}

/// Raw records in traversal order, before canonicalization.
pub fn differences(a: &Value, b: &Value) -> Vec<Difference> {
    let mut out = Vec::new();
    deep_diff(a, b, "", &mut out);
    out
}

/// Sort lexicographically and collapse every run of equal strings to one.
pub fn canonicalize(mut records: Vec<String>) -> Vec<String> {
    records.sort();
    records.dedup();
    records
}

fn deep_diff(a: &Value, b: &Value, path: &str, out: &mut Vec<Difference>) {
    let (kind_a, kind_b) = (Kind::of(a), Kind::of(b));

    if kind_a == Kind::Null && kind_b == Kind::Null {
        return;
    }

    if kind_a != kind_b {
        out.push(Difference {
            path: path.to_string(),
            kind: DiffKind::DifferentTypes {
                a: render(a),
                b: render(b),
            },
        });
        return;
    }

    match (a, b) {
        (Value::Bool(_), Value::Bool(_))
        | (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_)) => {
            if a != b {
                out.push(Difference {
                    path: path.to_string(),
                    kind: DiffKind::DifferentValues(kind_a),
                });
            }
        }
        (Value::Object(map_a), Value::Object(map_b)) => {
            for (key, value_a) in map_a {
                let child = format!("{}/{}", path, key);
                match map_b.get(key) {
                    Some(value_b) => deep_diff(value_a, value_b, &child, out),
                    None => out.push(Difference {
                        path: child,
                        kind: DiffKind::OnlyInA,
                    }),
                }
            }
            for key in map_b.keys().filter(|key| !map_a.contains_key(*key)) {
                out.push(Difference {
                    path: format!("{}/{}", path, key),
                    kind: DiffKind::OnlyInB,
                });
            }
        }
        (Value::Array(items_a), Value::Array(items_b)) => {
            if items_a.len() != items_b.len() {
                out.push(Difference {
                    path: path.to_string(),
                    kind: DiffKind::DifferentArrayLength,
                });
                return;
            }
            for (index, (item_a, item_b)) in items_a.iter().zip(items_b).enumerate() {
                deep_diff(item_a, item_b, &format!("{}/{}", path, index), out);
            }
        }
        _ => out.push(Difference {
            path: path.to_string(),
            kind: DiffKind::Unknown,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_canonicalize_empty_and_single() {
        assert_eq!(canonicalize(vec![]), Vec::<String>::new());
        assert_eq!(canonicalize(strings(&["a"])), strings(&["a"]));
    }

    #[test]
    fn test_canonicalize_sorts() {
        assert_eq!(canonicalize(strings(&["b", "a"])), strings(&["a", "b"]));
        assert_eq!(canonicalize(strings(&["b", "c", "a"])), strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_canonicalize_collapses_runs() {
        assert_eq!(canonicalize(strings(&["a", "a"])), strings(&["a"]));
        assert_eq!(canonicalize(strings(&["b", "a", "b"])), strings(&["a", "b"]));
        assert_eq!(
            canonicalize(strings(&["b", "c", "a", "c", "c", "c", "c"])),
            strings(&["a", "b", "c"])
        );
        assert_eq!(
            canonicalize(strings(&["a", "b", "c", "d", "d", "d"])),
            strings(&["a", "b", "c", "d"])
        );
        assert_eq!(
            canonicalize(strings(&["d", "b", "c", "a", "c", "b", "b", "c", "c", "c", "d"])),
            strings(&["a", "b", "c", "d"])
        );
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let once = canonicalize(strings(&["z", "a", "m", "a", "z", "z"]));
        assert_eq!(canonicalize(once.clone()), once);
    }

    #[test]
    fn test_identical_values() {
        let doc = json!({"a": [1, 2.5, "x", null, {"b": false}], "c": null});
        assert!(diff(&doc, &doc).is_empty());
        assert!(diff(&Value::Null, &Value::Null).is_empty());
        assert!(diff(&json!([]), &json!([])).is_empty());
    }

    #[test]
    fn test_type_mismatch_in_list() {
        let a = json!({"list": ["1", 2, 2.1]});
        let b = json!({"list": ["1", "2", "2.1"]});
        assert_eq!(
            diff(&a, &b),
            strings(&[
                "/list/1 => different types [2] and [2]",
                "/list/2 => different types [2.1] and [2.1]",
            ])
        );
    }

    #[test]
    fn test_key_asymmetry() {
        assert_eq!(
            diff(&json!({"x": 1}), &json!({"y": 1})),
            strings(&["/x => find only in A", "/y => find only in B"])
        );
    }

    #[test]
    fn test_scalar_value_differences() {
        let a = json!({"b": true, "i": 1, "f": 1.5, "s": "x"});
        let b = json!({"b": false, "i": 2, "f": 2.5, "s": "y"});
        assert_eq!(
            diff(&a, &b),
            strings(&[
                "/b => different bool values",
                "/f => different float values",
                "/i => different int values",
                "/s => different string values",
            ])
        );
    }

    #[test]
    fn test_root_scalar_difference_has_empty_path() {
        assert_eq!(diff(&json!(1), &json!(2)), strings(&[" => different int values"]));
    }

    #[test]
    fn test_null_against_value() {
        assert_eq!(
            diff(&json!({"a": null}), &json!({"a": "v"})),
            strings(&["/a => different types [null] and [v]"])
        );
    }

    #[test]
    fn test_array_length_short_circuits() {
        assert_eq!(
            diff(&json!([1, 2]), &json!([1])),
            strings(&[" => different array length"])
        );
        assert_eq!(
            diff(&json!({"l": [1, 2, 3]}), &json!({"l": [9]})),
            strings(&["/l => different array length"])
        );
    }

    #[test]
    fn test_nested_paths() {
        let a = json!({"svc": [{"port": 80}, {"port": 81, "tls": true}]});
        let b = json!({"svc": [{"port": 80}, {"port": 82}]});
        assert_eq!(
            diff(&a, &b),
            strings(&[
                "/svc/1/port => different int values",
                "/svc/1/tls => find only in A",
            ])
        );
    }

    #[test]
    fn test_int_and_float_are_different_kinds() {
        assert_eq!(
            diff(&json!(1), &json!(1.0)),
            strings(&[" => different types [1] and [1.0]"])
        );
    }

    #[test]
    fn test_difference_display() {
        let record = Difference {
            path: "/a/0".to_string(),
            kind: DiffKind::Unknown,
        };
        assert_eq!(record.to_string(), "/a/0 => //unknown error");
    }
}
