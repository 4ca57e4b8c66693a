use crate::conf::{LogConfig, LogOutput};
use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "tallyd.log";

/// Initialize the logging system.
///
/// - `RUST_LOG` wins over the configured level
/// - JSON output flattens event fields, text output is human readable
/// - with `dir` set, logs go to daily rolling files instead of stdout, at
///   most `max_files` of them
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for as long as the daemon runs.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (writer, guard) = match &config.dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .max_log_files(config.max_files)
                .build(dir)
                .with_context(|| format!("failed to open log dir {}", dir.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let installed = match config.format {
        LogOutput::Json => fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .json()
            .flatten_event(true)
            .try_init(),
        LogOutput::Text => fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(config.dir.is_none())
            .try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(guard)
}

/// Plain stdout logging for commands that run before a config is loaded.
pub fn init_cli_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
