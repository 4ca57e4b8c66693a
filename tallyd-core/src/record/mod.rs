//! Access log records.
//!
//! A line flows through a [`LineParser`] (field splitting) and then
//! [`parse_line`] (type conversion) to become a [`LogRecord`]. Any failure
//! along the way is a record-level error: the caller counts it and moves on.

mod format;
mod parse;
mod types;


pub use format::{
    AccessLogFormat, DEFAULT_LOG_FORMAT, FormatError, LineError, LineParser, RawFields,
};
pub use parse::{RecordError, parse_line, parse_time};
pub use types::{LogRecord, RECORD_TIME_FORMAT};
