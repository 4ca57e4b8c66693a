//! Daemon configuration: a TOML file, validated as a whole and compiled
//! into [`RuntimeConfig`].

mod error;
mod loader;
mod runtime;
pub mod types;
mod validate;


pub use error::ConfigError;
pub use loader::{ValidatedConfig, load_config, parse_config};
pub use runtime::RuntimeConfig;
pub use types::{LogConfig, LogOutput, TallydConfig};
pub use validate::{ValidationIssue, validate_config};
