use crate::conf::error::ConfigError;
use crate::conf::runtime::RuntimeConfig;
use crate::conf::types::TallydConfig;
use crate::conf::validate::validate_config;
use std::fs;
use std::path::Path;

/// Configuration as read from disk, together with its compiled form.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub source: TallydConfig,
    pub runtime: RuntimeConfig,
}

pub fn load_config(path: &Path) -> Result<ValidatedConfig, ConfigError> {
    //--------------------------------------------------------------------------
    // Hard fail: IO and parsing
    //--------------------------------------------------------------------------
    let raw = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let source = parse_config(&raw, path)?;

    //--------------------------------------------------------------------------
    // Semantic validation (aggregate all errors)
    //--------------------------------------------------------------------------
    let runtime =
        validate_config(&source).map_err(|issues| ConfigError::Validation { issues })?;

    tracing::debug!(
        config = %path.display(),
        streams = runtime.streams.len(),
        "configuration loaded"
    );

    Ok(ValidatedConfig { source, runtime })
}

/// Parse TOML text; `origin` only labels errors.
pub fn parse_config(raw: &str, origin: &Path) -> Result<TallydConfig, ConfigError> {
    toml::from_str(raw).map_err(|e| ConfigError::parse(origin, e))
}
