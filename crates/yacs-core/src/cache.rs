//! Resolution cache
//!
//! Shared by every resolution in a run. Two tables live behind read/write
//! locks:
//! - resolved values, keyed by absolute reference (`<document>#<pointer>`)
//! - raw fetched documents, keyed by absolute document location
//!
//! Values are cloned on the way in and on the way out. Two workers missing
//! the same key at once may both fetch; the later store overwrites an
//! identical value.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

#[derive(Debug, Default)]
pub struct ResolutionCache {
    resolved: RwLock<HashMap<String, Value>>,
    documents: RwLock<HashMap<String, Arc<Value>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the resolved value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let resolved = self.resolved.read().unwrap_or_else(|e| e.into_inner());
        resolved.get(key).cloned()
    }

    /// Store a copy of `value` under `key`.
    pub fn insert(&self, key: &str, value: &Value) {
        let copy = value.clone();
        let mut resolved = self.resolved.write().unwrap_or_else(|e| e.into_inner());
        resolved.insert(key.to_string(), copy);
    }

    /// The raw document fetched from `location`, if any.
    ///
    /// Documents are immutable once stored, so they are shared rather than copied.
    pub fn document(&self, location: &str) -> Option<Arc<Value>> {
        let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
        documents.get(location).cloned()
    }

    pub fn insert_document(&self, location: &str, document: Value) -> Arc<Value> {
        let document = Arc::new(document);
        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        documents.insert(location.to_string(), Arc::clone(&document));
        document
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.resolved.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
