use crate::classify::{AggregationRule, ExtractionRule, RuleSet};
use crate::conf::runtime::RuntimeConfig;
use crate::conf::types::TallydConfig;
use crate::record::AccessLogFormat;
use crate::storage::StorageSettings;
use crate::tail::Stream;
use crate::template::FileTemplate;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// One problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending key, e.g. `streams[1].input`.
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, field: impl Into<String>, message: impl fmt::Display) {
        self.0.push(ValidationIssue {
            field: field.into(),
            message: message.to_string(),
        });
    }

    fn regex(&mut self, field: String, pattern: &str) -> Option<Regex> {
        Regex::new(pattern)
            .map_err(|e| self.push(field, format!("invalid regex '{pattern}': {e}")))
            .ok()
    }

    fn regexes(&mut self, field: &str, patterns: &[String]) -> Vec<Regex> {
        patterns
            .iter()
            .enumerate()
            .filter_map(|(i, p)| self.regex(format!("{field}[{i}]"), p))
            .collect()
    }

    fn template(&mut self, field: String, raw: &str) -> Option<FileTemplate> {
        FileTemplate::parse(raw)
            .map_err(|e| self.push(field, e))
            .ok()
    }
}

/// Check every setting and compile the configuration, reporting all
/// problems at once.
pub fn validate_config(config: &TallydConfig) -> Result<RuntimeConfig, Vec<ValidationIssue>> {
    let mut issues = Issues::default();

    //--------------------------------------------------------------------------
    // Scalars
    //--------------------------------------------------------------------------
    if config.interval == 0 {
        issues.push("interval", "must be greater than zero");
    }

    let log_format = AccessLogFormat::new(&config.log_format)
        .map_err(|e| issues.push("log_format", e))
        .ok();

    let percentiles: Vec<u8> = config
        .latency_percentiles
        .iter()
        .filter_map(|p| match u8::try_from(*p) {
            Ok(p) if p <= 100 => Some(p),
            _ => {
                issues.push("latency_percentiles", format!("{p} is outside 0..=100"));
                None
            }
        })
        .collect();

    if EnvFilter::try_new(&config.log.level).is_err() {
        issues.push("log.level", format!("invalid filter '{}'", config.log.level));
    }
    if config.log.max_files == 0 {
        issues.push("log.max_files", "must keep at least one file");
    }

    //--------------------------------------------------------------------------
    // Request rules
    //--------------------------------------------------------------------------
    if config.valid_requests.is_empty() {
        issues.push("valid_requests", "at least one pattern is required");
    }
    let valid = issues.regexes("valid_requests", &config.valid_requests);
    let skip = issues.regexes("skip_requests", &config.skip_requests);

    let forbidden = if config.forbidden_symbols.is_empty() {
        None
    } else {
        issues.regex("forbidden_symbols".to_string(), &config.forbidden_symbols)
    };

    let mut aggregation = Vec::new();
    for (i, rule) in config.aggregation.iter().enumerate() {
        if rule.group.is_empty() || rule.method.is_empty() {
            issues.push(format!("aggregation[{i}]"), "group and method must not be empty");
        }
        if let Some(pattern) = issues.regex(format!("aggregation[{i}].pattern"), &rule.pattern) {
            aggregation.push(AggregationRule {
                group: rule.group.clone(),
                method: rule.method.clone(),
                pattern,
            });
        }
    }

    let mut extraction = Vec::new();
    let mut names = HashSet::new();
    for (i, rule) in config.patterns.iter().enumerate() {
        if rule.name.is_empty() {
            issues.push(format!("patterns[{i}].name"), "must not be empty");
        } else if !names.insert(rule.name.as_str()) {
            issues.push(format!("patterns[{i}].name"), format!("duplicate name '{}'", rule.name));
        }
        if rule.patterns.is_empty() {
            issues.push(format!("patterns[{i}].patterns"), "at least one pattern is required");
        }
        extraction.push(ExtractionRule {
            name: rule.name.clone(),
            patterns: issues.regexes(&format!("patterns[{i}].patterns"), &rule.patterns),
        });
    }

    //--------------------------------------------------------------------------
    // Streams
    //--------------------------------------------------------------------------
    if config.streams.is_empty() {
        issues.push("streams", "at least one stream is required");
    }

    let mut streams = Vec::new();
    let mut outputs = HashSet::new();
    for (i, stream) in config.streams.iter().enumerate() {
        if !outputs.insert(&stream.output) {
            issues.push(
                format!("streams[{i}].output"),
                format!("duplicate output {}", stream.output.display()),
            );
        }

        let input = issues.template(format!("streams[{i}].input"), &stream.input);
        let previous = stream
            .previous
            .as_ref()
            .and_then(|raw| issues.template(format!("streams[{i}].previous"), raw));

        if let Some(input) = input {
            streams.push(Stream {
                input,
                previous,
                output: stream.output.clone(),
            });
        }
    }

    //--------------------------------------------------------------------------
    // Build runtime config
    //--------------------------------------------------------------------------
    let (Some(log_format), true) = (log_format, issues.0.is_empty()) else {
        return Err(issues.0);
    };

    Ok(RuntimeConfig {
        interval: Duration::from_secs(config.interval),
        log_format,
        latency_in_millis: config.latency_in_millis,
        rules: RuleSet {
            valid,
            skip,
            aggregation,
            extraction,
            forbidden,
        },
        storage: StorageSettings {
            permanent_codes: config.response_codes.clone(),
            percentiles,
            stalled_threshold: config.stalled_call_threshold,
            pattern_names: config.patterns.iter().map(|p| p.name.clone()).collect(),
        },
        streams,
        pid_file: config.pid_file.clone(),
        log: config.log.clone(),
    })
}
