//! Inheritance merging
//!
//! An object carrying `@parent` is laid over its parent(s):
//! - objects: deep-merge by key
//! - arrays and scalars: the child's value replaces the parent's
//! - keys named in a parent's `@lock_names` keep the parent's value
//!
//! Parents are applied from the last declared to the first, each time with
//! the parent as base and the accumulated result as overlay. The first
//! declared parent is therefore applied last, and its lock names have the
//! final say.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::value::{LOCK_KEY, PARENT_KEY, SCHEMAS_KEY};

/// Key names an object protects through `@lock_names`.
///
/// Accepts a string, an array (non-string entries ignored) or an object
/// (its keys are the names). Anything else locks nothing.
pub fn lock_names(node: &Value) -> BTreeSet<String> {
    match node.get(LOCK_KEY) {
        Some(Value::String(name)) => BTreeSet::from([name.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        _ => BTreeSet::new(),
    }
}

/// Lay `over` on top of `base`, honoring the base's lock names.
///
/// Only objects merge; for any other pairing the overlay wins outright.
pub fn overlay(base: &Value, over: &Value) -> Value {
    let (Value::Object(base_map), Value::Object(over_map)) = (base, over) else {
        return over.clone();
    };

    let locked = lock_names(base);
    let mut out = base_map.clone();

    for (key, value) in over_map {
        if locked.contains(key) {
            continue;
        }

        if key == SCHEMAS_KEY {
            if !value.is_null() {
                out.insert(key.clone(), value.clone());
            } else {
                out.entry(key.clone()).or_insert(Value::Null);
            }
            continue;
        }

        let merged = match base_map.get(key) {
            Some(existing) if !existing.is_null() && value.is_object() => overlay(existing, value),
            _ => value.clone(),
        };
        out.insert(key.clone(), merged);
    }

    Value::Object(out)
}

/// Resolve every `@parent` directive in `doc`, at any depth.
pub fn merge_parents(doc: &Value) -> Value {
    match doc {
        Value::Object(map) => {
            let merged = match map.get(PARENT_KEY) {
                Some(parents) => merge_with_parents(map, parents),
                None => Value::Object(map.clone()),
            };

            match merged {
                Value::Object(merged) => Value::Object(
                    merged
                        .iter()
                        .map(|(key, value)| (key.clone(), merge_parents(value)))
                        .collect(),
                ),
                other => other,
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(merge_parents).collect()),
        other => other.clone(),
    }
}

fn merge_with_parents(map: &Map<String, Value>, parents: &Value) -> Value {
    let mut own = map.clone();
    own.remove(PARENT_KEY);

    let parents: Vec<Value> = match parents {
        Value::Array(items) => items.iter().map(merge_parents).collect(),
        single => vec![merge_parents(single)],
    };

    parents
        .iter()
        .rev()
        .fold(Value::Object(own), |acc, parent| overlay(parent, &acc))
}
