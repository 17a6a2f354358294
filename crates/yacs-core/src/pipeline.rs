//! Single-document pipeline: load → resolve → inherit → validate or strip.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::cache::ResolutionCache;
use crate::error::Result;
use crate::inherit::merge_parents;
use crate::loader::Loader;
use crate::reference::Resolver;
use crate::schema::{strip_schema_references, validate_schemas, JsonSchemaValidator, Validator};

/// Which stages run for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    pub resolve: bool,
    pub inherit: bool,
    pub validate: bool,
    pub verbose: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            resolve: true,
            inherit: true,
            validate: true,
            verbose: false,
        }
    }
}

/// Runs the pipeline for one locator at a time; cheap to clone into workers.
#[derive(Clone)]
pub struct Processor {
    resolver: Resolver,
    validator: Arc<dyn Validator>,
}

impl Processor {
    /// A processor validating with [`JsonSchemaValidator`].
    pub fn new(loader: Arc<dyn Loader>, cache: Arc<ResolutionCache>) -> Self {
        Self::with_validator(loader, cache, Arc::new(JsonSchemaValidator))
    }

    pub fn with_validator(
        loader: Arc<dyn Loader>,
        cache: Arc<ResolutionCache>,
        validator: Arc<dyn Validator>,
    ) -> Self {
        Self {
            resolver: Resolver::new(loader, cache),
            validator,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Produce the final document for `locator`.
    pub fn process(&self, locator: &str, options: &ProcessOptions) -> Result<Value> {
        let (mut doc, ctx) = self.resolver.load(locator)?;

        if options.resolve {
            debug!(%locator, "resolving references");
            doc = self.resolver.resolve(&doc, &ctx)?;
        }

        if options.inherit {
            debug!(%locator, "merging parents");
            doc = merge_parents(&doc);
        }

        if !options.validate {
            return Ok(strip_schema_references(&doc));
        }

        let validated = validate_schemas(&doc, self.validator.as_ref())?;
        if options.verbose {
            info!(%locator, "document is valid");
        }
        Ok(validated)
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
