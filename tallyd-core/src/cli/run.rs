use crate::conf::load_config;
use crate::daemon;
use crate::logging::init_logging;
use anyhow::Context;
use std::path::PathBuf;

/// Load the config, set up logging and run the daemon loop.
pub fn run(config: PathBuf, once: bool) -> anyhow::Result<()> {
    let cfg = load_config(&config)
        .with_context(|| format!("failed to load config {}", config.display()))?;

    let _guard = init_logging(&cfg.runtime.log)?;
    tracing::info!(config = %config.display(), once, "tallyd starting");

    daemon::run(cfg.runtime, once)
}
