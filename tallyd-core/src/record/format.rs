use regex::Regex;
use thiserror::Error;

pub const TIME_DIRECTIVE: &str = "%t";
pub const REQUEST_DIRECTIVE: &str = "%r";
pub const STATUS_DIRECTIVES: &[&str] = &["%>s", "%s"];
pub const LATENCY_DIRECTIVE: &str = "%D";

/// The default Apache combined format extended with `%D` (microseconds).
pub const DEFAULT_LOG_FORMAT: &str =
    r#"%h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-Agent}i" %D"#;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("log format is empty")]
    Empty,

    #[error("log format '{format}' lacks required directive {directive}")]
    MissingDirective { format: String, directive: String },

    #[error("log format '{format}' could not be compiled: {source}")]
    Regex {
        format: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("line does not match the configured log format")]
    NoMatch,
}

/// Raw field strings of a single access log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub time: &'a str,
    pub request: &'a str,
    pub status: &'a str,
    pub latency: &'a str,
}

/// Splits a log line into the raw fields the record parser needs.
pub trait LineParser {
    fn fields<'a>(&self, line: &'a str) -> Result<RawFields<'a>, LineError>;
}

/// A line parser compiled from an Apache `LogFormat` string.
#[derive(Debug, Clone)]
pub struct AccessLogFormat {
    source: String,
    regex: Regex,
    time: usize,
    request: usize,
    status: usize,
    latency: usize,
}

impl AccessLogFormat {
    pub fn new(format: &str) -> Result<Self, FormatError> {
        let tokens: Vec<&str> = format.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(FormatError::Empty);
        }

        let mut directives = Vec::with_capacity(tokens.len());
        let mut pattern = String::from("^");
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                pattern.push(' ');
            }
            let (directive, quoted) = strip_quotes(token);
            pattern.push_str(match (quoted, directive) {
                (true, _) => r#""((?:[^"\\]|\\.)*)""#,
                (false, TIME_DIRECTIVE) => r"\[([^\]]*)\]",
                (false, _) => r"(\S*)",
            });
            directives.push(directive);
        }
        pattern.push_str(r"\s*$");

        let find = |wanted: &[&str]| {
            directives
                .iter()
                .position(|d| wanted.contains(d))
                .map(|i| i + 1)
                .ok_or_else(|| FormatError::MissingDirective {
                    format: format.to_string(),
                    directive: wanted.join(" or "),
                })
        };
        let time = find(&[TIME_DIRECTIVE])?;
        let request = find(&[REQUEST_DIRECTIVE])?;
        let status = find(STATUS_DIRECTIVES)?;
        let latency = find(&[LATENCY_DIRECTIVE])?;

        let regex = Regex::new(&pattern).map_err(|source| FormatError::Regex {
            format: format.to_string(),
            source,
        })?;

        Ok(Self {
            source: format.to_string(),
            regex,
            time,
            request,
            status,
            latency,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl LineParser for AccessLogFormat {
    fn fields<'a>(&self, line: &'a str) -> Result<RawFields<'a>, LineError> {
        let caps = self.regex.captures(line).ok_or(LineError::NoMatch)?;
        let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        Ok(RawFields {
            time: field(self.time),
            request: field(self.request),
            status: field(self.status),
            latency: field(self.latency),
        })
    }
}

fn strip_quotes(token: &str) -> (&str, bool) {
    for quote in [r#"\""#, "\""] {
        if let Some(inner) = token
            .strip_prefix(quote)
            .and_then(|t| t.strip_suffix(quote))
        {
            return (inner, true);
        }
    }
    (token, false)
}
