use crate::record::DEFAULT_LOG_FORMAT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The configuration file as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TallydConfig {
    /// Seconds between rounds.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Apache `LogFormat` of the input logs.
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Integer `%D` values are milliseconds rather than microseconds.
    #[serde(default)]
    pub latency_in_millis: bool,

    /// Calls slower than this many milliseconds count as stalled.
    #[serde(default = "default_stalled_call_threshold")]
    pub stalled_call_threshold: u64,

    #[serde(default = "default_latency_percentiles")]
    pub latency_percentiles: Vec<i64>,

    /// Response codes present in every dump, observed or not.
    #[serde(default = "default_response_codes")]
    pub response_codes: Vec<u16>,

    /// Removed from method identifiers. Empty disables stripping.
    #[serde(default = "default_forbidden_symbols")]
    pub forbidden_symbols: String,

    #[serde(default)]
    pub valid_requests: Vec<String>,

    #[serde(default)]
    pub skip_requests: Vec<String>,

    #[serde(default)]
    pub aggregation: Vec<AggregationConfig>,

    #[serde(default)]
    pub patterns: Vec<PatternConfig>,

    #[serde(default)]
    pub streams: Vec<StreamConfig>,

    #[serde(default)]
    pub pid_file: Option<PathBuf>,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationConfig {
    pub group: String,
    pub method: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    pub name: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Input log file-name template.
    pub input: String,

    /// Name the input gets after an in-place rotation.
    #[serde(default)]
    pub previous: Option<String>,

    /// Dump file.
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogOutput,

    /// Write the daemon's own log to daily files in this directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Daily files kept in `dir`; older ones are deleted.
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogOutput::default(),
            dir: None,
            max_files: default_max_log_files(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Json,
    #[default]
    Text,
}

fn default_interval() -> u64 {
    300
}

fn default_log_format() -> String {
    DEFAULT_LOG_FORMAT.to_string()
}

fn default_stalled_call_threshold() -> u64 {
    4000
}

fn default_latency_percentiles() -> Vec<i64> {
    vec![50, 90, 99]
}

fn default_response_codes() -> Vec<u16> {
    vec![200, 404, 500]
}

fn default_forbidden_symbols() -> String {
    "[.-]".to_string()
}

fn default_max_log_files() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}
