mod dump;
mod logdir;
pub mod tracing;

pub use dump::DumpFile;
pub use logdir::{StreamEntry, TestLogDir};
pub use tracing::{CapturedEvent, EventLog, init_test_tracing};
