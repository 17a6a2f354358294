//! Tool configuration
//!
//! Settings are merged from four layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Host/user config (~/.config/yacs/config.toml)
//! 3. Project config (./yacs.toml or --config)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{BatchSettings, HttpSettings, Settings};
pub use defaults::FALLBACK_WORKERS;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, PROJECT_CONFIG_FILE};
pub use merge::{deep_merge, merge_layers};
