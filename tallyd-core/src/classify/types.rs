use regex::Regex;
use std::collections::HashMap;

/// Group label used when a valid request carries no `group` capture.
pub const NO_GROUP: &str = "nogroup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Parsed,
    Skipped,
    Error,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Parsed => "parsed",
            RequestStatus::Skipped => "skipped",
            RequestStatus::Error => "error",
        }
    }
}

/// The outcome of classifying one request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedRequest {
    pub group: Option<String>,
    pub method: String,
    pub status: RequestStatus,
    /// Extraction rule name -> matched value.
    pub patterns: HashMap<String, String>,
    pub(crate) method_id: String,
}

impl ProcessedRequest {
    pub(crate) fn with_status(status: RequestStatus) -> Self {
        Self {
            group: None,
            method: String::new(),
            status,
            patterns: HashMap::new(),
            method_id: String::new(),
        }
    }

    /// `group_method` with forbidden symbols removed. Empty unless the
    /// request was parsed.
    pub fn method_id(&self) -> &str {
        &self.method_id
    }
}

/// Replaces the group and method of matching valid requests.
#[derive(Debug, Clone)]
pub struct AggregationRule {
    pub group: String,
    pub method: String,
    pub pattern: Regex,
}

/// Extracts a named value from parsed requests, first matching pattern wins.
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub name: String,
    pub patterns: Vec<Regex>,
}
