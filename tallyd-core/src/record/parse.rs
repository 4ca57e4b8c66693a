use crate::latency::{self, LatencyError, MILLISECOND_EXPONENT};
use crate::record::format::{LineError, LineParser};
use crate::record::types::LogRecord;
use chrono::{DateTime, NaiveDateTime};
use thiserror::Error;

const LOG_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";
const LOG_TIME_FORMAT_NO_ZONE: &str = "%d/%b/%Y:%H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error(transparent)]
    Line(#[from] LineError),

    #[error("unparsable time '{0}'")]
    Time(String),

    #[error("malformed request '{0}'")]
    Request(String),

    #[error("non-integer response code '{0}'")]
    ResponseCode(String),

    #[error(transparent)]
    Latency(#[from] LatencyError),
}

/// Turn one access log line into a [`LogRecord`].
///
/// With `latency_in_millis`, integer latency tokens are milliseconds rather
/// than microseconds and get padded before decoding so every stream ends up
/// on the same scale.
pub fn parse_line<P>(line: &str, parser: &P, latency_in_millis: bool) -> Result<LogRecord, RecordError>
where
    P: LineParser + ?Sized,
{
    let line = line.trim_end_matches(['\r', '\n']);
    let fields = parser.fields(line)?;

    let timestamp = parse_time(fields.time)?;

    let raw_request = fields
        .request
        .split(' ')
        .nth(1)
        .filter(|target| !target.is_empty())
        .ok_or_else(|| RecordError::Request(fields.request.to_string()))?;

    let response_code = fields
        .status
        .parse::<u16>()
        .map_err(|_| RecordError::ResponseCode(fields.status.to_string()))?;

    let latency = if latency_in_millis && !fields.latency.contains('.') {
        latency::decode(&format!("{}000", fields.latency), MILLISECOND_EXPONENT)?
    } else {
        latency::decode(fields.latency, MILLISECOND_EXPONENT)?
    };

    Ok(LogRecord {
        timestamp,
        raw_request: raw_request.to_string(),
        response_code,
        latency,
        line: line.to_string(),
    })
}

/// Parse a `%t` value. The wall-clock part is kept as written.
pub fn parse_time(value: &str) -> Result<NaiveDateTime, RecordError> {
    DateTime::parse_from_str(value, LOG_TIME_FORMAT)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(value, LOG_TIME_FORMAT_NO_ZONE))
        .map_err(|_| RecordError::Time(value.to_string()))
}
