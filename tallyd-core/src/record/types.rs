use chrono::NaiveDateTime;

/// Format of record timestamps in dumps and diagnostics.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One parsed access log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    /// Request target, e.g. `/content/csl/activation?id=1`.
    pub raw_request: String,
    pub response_code: u16,
    /// Latency in milliseconds.
    pub latency: u64,
    pub line: String,
}

impl LogRecord {
    pub fn is_before(&self, time: NaiveDateTime) -> bool {
        self.timestamp < time
    }

    pub fn formatted_time(&self) -> String {
        self.timestamp.format(RECORD_TIME_FORMAT).to_string()
    }
}
