//! Round-based tailing of rotating access logs.
//!
//! Every round reads, per configured stream, the records of one half-open
//! [`Period`] and dumps the aggregated statistics. Read offsets live in a
//! [`SeekTable`] for the lifetime of the process; on start they are
//! bootstrapped from record timestamps by the seek locator.

mod error;
mod period;
mod processor;
mod seek_table;
mod types;

#[cfg(test)]
mod tests;

pub use error::TailError;
pub use period::Period;
pub use processor::{RoundProcessor, RoundSummary};
pub use seek_table::SeekTable;
pub use types::Stream;
