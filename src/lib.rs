//! YACS - JSON configuration processor
//!
//! Runs `yacs-core` documents end to end: reads them from disk or HTTP,
//! resolves, merges and validates them, writes the results, and fans whole
//! directories out over a worker pool.

pub mod batch;
pub mod compare;
pub mod config;
pub mod loader;
pub mod logging;
pub mod signal;
pub mod writer;

pub use batch::{discover, BatchCoordinator, BatchError, BatchSummary, ExcludeRules, WorkItem};
pub use compare::{compare, render_report};
pub use config::{ConfigError, EffectiveConfig, Settings};
pub use loader::TransportLoader;
pub use signal::{CancelState, SignalHandler};
pub use writer::{save_json, to_pretty_json, WriteError};
