//! URI context
//!
//! Tracks the location of the document currently being resolved so relative
//! references can be made absolute. Resolving a reference into another
//! document works on a clone, so the caller's location never changes
//! behind its back.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use url::Url;

/// Location (and content) of the document a reference is resolved against.
#[derive(Debug, Clone, Default)]
pub struct UriContext {
    location: String,
    document: Option<Arc<Value>>,
    /// Cache keys of references still being resolved on this path.
    in_flight: Vec<String>,
}

impl UriContext {
    /// An anonymous context: no location, no document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context positioned on an already loaded document.
    pub fn with_document(location: impl Into<String>, document: Value) -> Self {
        Self {
            location: location.into(),
            document: Some(Arc::new(document)),
            in_flight: Vec::new(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// The raw (unresolved) document behind `location`, if one is loaded.
    pub fn document(&self) -> Option<&Value> {
        self.document.as_deref()
    }

    /// Move to a freshly fetched document.
    pub fn set_location(&mut self, location: impl Into<String>, document: Arc<Value>) {
        self.location = location.into();
        self.document = Some(document);
    }

    /// Make `uri` absolute relative to the current location.
    pub fn absolute(&self, uri: &str) -> String {
        if is_url(uri) {
            return uri.to_string();
        }

        let uri = uri.strip_prefix("file://").unwrap_or(uri);

        if Path::new(uri).is_absolute() {
            return clean_path(Path::new(uri));
        }

        if uri == "." {
            return self.location.clone();
        }

        if is_url(&self.location) {
            if let Ok(joined) = Url::parse(&self.location).and_then(|base| base.join(uri)) {
                return joined.to_string();
            }
        }

        let current = self.location.strip_prefix("file://").unwrap_or(&self.location);
        let dir = Path::new(current).parent().unwrap_or_else(|| Path::new(""));
        clean_path(&dir.join(uri))
    }

    pub(crate) fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.iter().any(|k| k == key)
    }

    pub(crate) fn enter(&mut self, key: &str) {
        self.in_flight.push(key.to_string());
    }

    pub(crate) fn chain_to(&self, key: &str) -> Vec<String> {
        let mut chain = self.in_flight.clone();
        chain.push(key.to_string());
        chain
    }
}

/// `http` and `https` URLs are fetched over the network; everything else is a path.
pub fn is_url(locator: &str) -> bool {
    Url::parse(locator)
        .map(|u| u.scheme() == "http" || u.scheme() == "https")
        .unwrap_or(false)
}

/// Lexically collapse `.` and `..` components.
fn clean_path(path: &Path) -> String {
    let mut out = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            other => out.push(other.as_os_str()),
        }
    }

    if out.as_os_str().is_empty() {
        ".".to_string()
    } else {
        out.to_string_lossy().into_owned()
    }
}
