use crate::classify::RuleSet;
use crate::conf::types::LogConfig;
use crate::record::AccessLogFormat;
use crate::storage::StorageSettings;
use crate::tail::Stream;
use std::path::PathBuf;
use std::time::Duration;

/// Validated configuration, compiled into the types the daemon runs on.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub interval: Duration,
    pub log_format: AccessLogFormat,
    pub latency_in_millis: bool,
    pub rules: RuleSet,
    pub storage: StorageSettings,
    pub streams: Vec<Stream>,
    pub pid_file: Option<PathBuf>,
    pub log: LogConfig,
}
