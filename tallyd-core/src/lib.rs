pub mod classify;
pub mod cli;
pub mod conf;
pub mod daemon;
pub mod latency;
pub mod logging;
pub mod record;
pub mod seek;
pub mod storage;
pub mod tail;
pub mod template;

/// Version reported in every dump.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
