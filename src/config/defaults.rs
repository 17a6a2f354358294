//! Built-in defaults (layer 1) and the typed settings they populate.

use std::thread;

use serde::{Deserialize, Serialize};
use yacs_core::ProcessOptions;

/// Worker count when parallelism cannot be detected.
pub const FALLBACK_WORKERS: usize = 4;

/// Typed view of the effective configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Batch worker threads; 0 means detected parallelism.
    pub workers: usize,

    /// Work queue capacity per worker.
    pub queue_factor: usize,

    /// Resolve `$ref` nodes.
    pub resolve: bool,

    /// Merge `@parent` directives.
    pub inherit: bool,

    /// Validate against `@schemas` (otherwise the directives are only stripped).
    pub validate: bool,

    pub http: HttpSettings,

    pub batch: BatchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout; 0 waits indefinitely.
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Glob patterns (relative to the input directory) skipped during discovery.
    pub exclude: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: 0,
            queue_factor: 3,
            resolve: true,
            inherit: true,
            validate: true,
            http: HttpSettings { timeout_seconds: 0 },
            batch: BatchSettings { exclude: Vec::new() },
        }
    }
}

impl Settings {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "workers": self.workers,
            "queue_factor": self.queue_factor,
            "resolve": self.resolve,
            "inherit": self.inherit,
            "validate": self.validate,
            "http": {
                "timeout_seconds": self.http.timeout_seconds
            },
            "batch": {
                "exclude": self.batch.exclude
            }
        })
    }

    /// Effective worker count.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        thread::available_parallelism()
            .map(|n| n.get())
            .ok()
            .filter(|&n| n > 1)
            .unwrap_or(FALLBACK_WORKERS)
    }

    /// Bounded queue capacity for the batch coordinator.
    pub fn queue_capacity(&self) -> usize {
        self.worker_count() * self.queue_factor.max(1)
    }

    pub fn process_options(&self, verbose: bool) -> ProcessOptions {
        ProcessOptions {
            resolve: self.resolve,
            inherit: self.inherit,
            validate: self.validate,
            verbose,
        }
    }
}
