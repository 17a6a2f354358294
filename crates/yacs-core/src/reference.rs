//! JSON Reference resolution
//!
//! A node `{"$ref": "<document>#<pointer>"}` is replaced by the value the
//! URI designates. The document part may be empty (same document), a path
//! relative to the current document, an absolute path or an HTTP(S) URL.
//! The pointer is a `/`-separated walk through object keys and array
//! indices; a step that does not exist produces `null`.
//!
//! Resolved values are stored in the shared [`ResolutionCache`] under
//! `<absolute document>#<pointer>` and fetched documents are memoized per
//! absolute location, so each document is read once per run.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::cache::ResolutionCache;
use crate::context::UriContext;
use crate::error::{Error, Result};
use crate::loader::{parse_document, Loader};
use crate::value::{child, is_resolution_disabled, render, REF_KEY};

/// A reference URI split at its fragment delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Document part; empty means the current document.
    pub base: String,
    /// Fragment part; empty means the whole document.
    pub pointer: String,
}

impl Reference {
    pub fn parse(uri: &str) -> Result<Self> {
        if uri.is_empty() {
            return Err(Error::pointer(uri, "empty reference"));
        }

        let (base, pointer) = match uri.split_once('#') {
            Some((base, pointer)) => (base, pointer),
            None => (uri, ""),
        };

        if pointer.contains('#') {
            return Err(Error::pointer(uri, "more than one '#' delimiter"));
        }

        Ok(Self {
            base: base.to_string(),
            pointer: pointer.to_string(),
        })
    }

    /// Points into the document currently being resolved.
    pub fn is_local(&self) -> bool {
        self.base.is_empty()
    }
}

/// Walk `pointer` from `node`, returning a copy of the target or `null`.
pub fn resolve_pointer(node: &Value, pointer: &str) -> Value {
    if pointer.is_empty() || pointer == "/" {
        return node.clone();
    }

    let trimmed = pointer.strip_suffix('/').unwrap_or(pointer);
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);

    let mut current = node;
    for segment in trimmed.split('/') {
        match child(current, segment) {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current.clone()
}

/// Resolves `$ref` nodes through a [`Loader`] and a shared [`ResolutionCache`].
#[derive(Clone)]
pub struct Resolver {
    loader: Arc<dyn Loader>,
    cache: Arc<ResolutionCache>,
}

impl Resolver {
    pub fn new(loader: Arc<dyn Loader>, cache: Arc<ResolutionCache>) -> Self {
        Self { loader, cache }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Load the document named by `locator` (which may carry a `#pointer`).
    ///
    /// Returns the selected value and a context positioned on the document,
    /// ready for [`Resolver::resolve`]. The entry document only enters the
    /// cache if something references it.
    pub fn load(&self, locator: &str) -> Result<(Value, UriContext)> {
        let reference = Reference::parse(locator)?;
        if reference.is_local() {
            return Err(Error::pointer(locator, "locator does not name a document"));
        }

        let mut ctx = UriContext::new();
        let location = ctx.absolute(&reference.base);
        debug!(%location, "loading entry document");
        let bytes = self.loader.load(&location)?;
        let document = Arc::new(parse_document(&location, &bytes)?);

        let selected = resolve_pointer(&document, &reference.pointer);
        ctx.set_location(location, document);
        Ok((selected, ctx))
    }

    /// Return a copy of `doc` with every reference replaced by its target.
    pub fn resolve(&self, doc: &Value, ctx: &UriContext) -> Result<Value> {
        if is_resolution_disabled(doc) {
            return Ok(doc.clone());
        }

        match doc {
            Value::Object(map) if map.contains_key(REF_KEY) => self.resolve_reference(map, ctx),
            Value::Object(map) => {
                let mut out = Map::new();
                for (key, value) in map {
                    out.insert(key.clone(), self.resolve(value, ctx)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item, ctx))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            scalar => Ok(scalar.clone()),
        }
    }

    fn resolve_reference(&self, node: &Map<String, Value>, ctx: &UriContext) -> Result<Value> {
        let uri = match node.get(REF_KEY) {
            Some(Value::String(uri)) => uri.as_str(),
            Some(other) => {
                return Err(Error::pointer(render(other), "'$ref' value must be a string"));
            }
            None => return Err(Error::pointer("", "'$ref' key is missing")),
        };

        let reference = Reference::parse(uri)?;
        let location = if reference.is_local() {
            ctx.location().to_string()
        } else {
            ctx.absolute(&reference.base)
        };
        let key = format!("{}#{}", location, reference.pointer);
        // Anonymous documents have no identity to cache under.
        let cacheable = !location.is_empty();

        if cacheable {
            if let Some(hit) = self.cache.get(&key) {
                debug!(reference = %key, "resolution cache hit");
                return Ok(hit);
            }
        }

        if ctx.is_in_flight(&key) {
            return Err(Error::Cycle {
                chain: ctx.chain_to(&key),
            });
        }

        let mut doc_ctx = ctx.clone();
        doc_ctx.enter(&key);

        let target = if reference.is_local() {
            match doc_ctx.document() {
                Some(document) => resolve_pointer(document, &reference.pointer),
                None => {
                    return Err(Error::pointer(uri, "same-document reference outside a document"));
                }
            }
        } else {
            let document = self.fetch(&reference.base, &mut doc_ctx)?;
            resolve_pointer(&document, &reference.pointer)
        };

        let resolved = self.resolve(&target, &doc_ctx)?;
        if cacheable {
            self.cache.insert(&key, &resolved);
        }
        Ok(resolved)
    }

    /// Fetch the document `base` designates and move `ctx` onto it.
    fn fetch(&self, base: &str, ctx: &mut UriContext) -> Result<Arc<Value>> {
        let location = ctx.absolute(base);

        let document = match self.cache.document(&location) {
            Some(document) => {
                debug!(%location, "document cache hit");
                document
            }
            None => {
                debug!(%location, "fetching document");
                let bytes = self.loader.load(&location)?;
                let document = parse_document(&location, &bytes)?;
                self.cache.insert_document(&location, document)
            }
        };

        ctx.set_location(location, Arc::clone(&document));
        Ok(document)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
