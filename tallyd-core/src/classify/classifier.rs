use crate::classify::types::{
    AggregationRule, ExtractionRule, NO_GROUP, ProcessedRequest, RequestStatus,
};
use regex::{Captures, Regex};
use std::collections::HashMap;

const GROUP_CAPTURE: &str = "group";
const METHOD_CAPTURE: &str = "method";
const PATTERN_CAPTURE: &str = "pattern";

/// Compiled request classification rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub valid: Vec<Regex>,
    pub skip: Vec<Regex>,
    pub aggregation: Vec<AggregationRule>,
    pub extraction: Vec<ExtractionRule>,
    pub forbidden: Option<Regex>,
}

impl RuleSet {
    /// Names of every configured extraction rule, in configuration order.
    pub fn extraction_names(&self) -> Vec<String> {
        self.extraction.iter().map(|r| r.name.clone()).collect()
    }

    pub fn classify(&self, target: &str) -> ProcessedRequest {
        let Some(caps) = first_captures(&self.valid, target) else {
            let status = if first_captures(&self.skip, target).is_some() {
                RequestStatus::Skipped
            } else {
                RequestStatus::Error
            };
            return ProcessedRequest::with_status(status);
        };

        let (group, method) = match self.aggregate(target) {
            Some((group, method)) => (Some(group.to_string()), method.to_string()),
            None => {
                let Some(method) = caps.name(METHOD_CAPTURE) else {
                    return ProcessedRequest::with_status(RequestStatus::Error);
                };
                (
                    caps.name(GROUP_CAPTURE).map(|m| m.as_str().to_string()),
                    method.as_str().to_string(),
                )
            }
        };

        let mut request = ProcessedRequest::with_status(RequestStatus::Parsed);
        request.method_id = self.method_id(group.as_deref(), &method);
        request.group = group;
        request.method = method;
        request.patterns = self.extract(target);
        request
    }

    fn aggregate(&self, target: &str) -> Option<(&str, &str)> {
        self.aggregation
            .iter()
            .find(|rule| rule.pattern.is_match(target))
            .map(|rule| (rule.group.as_str(), rule.method.as_str()))
    }

    fn extract(&self, target: &str) -> HashMap<String, String> {
        self.extraction
            .iter()
            .filter_map(|rule| {
                let caps = first_captures(&rule.patterns, target)?;
                let value = caps.name(PATTERN_CAPTURE).or_else(|| caps.get(0))?;
                Some((rule.name.clone(), value.as_str().to_string()))
            })
            .collect()
    }

    fn method_id(&self, group: Option<&str>, method: &str) -> String {
        let name = format!("{}_{method}", group.unwrap_or(NO_GROUP));
        match &self.forbidden {
            Some(forbidden) => forbidden.replace_all(&name, "").into_owned(),
            None => name,
        }
    }
}

fn first_captures<'t>(regexes: &[Regex], target: &'t str) -> Option<Captures<'t>> {
    regexes.iter().find_map(|regex| regex.captures(target))
}
