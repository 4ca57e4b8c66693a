use crate::storage::dump::IniDump;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker written instead of zero or empty values, so dashboards do not
/// plot a false zero.
pub const UNKNOWN_VALUE: &str = "U";

/// Identifies one output stream; every storage keeps its values per stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamKey(String);

impl StreamKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Path> for StreamKey {
    fn from(path: &Path) -> Self {
        Self(path.display().to_string())
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no value '{key}' for stream {stream}")]
    NotFound { stream: StreamKey, key: String },

    #[error("failed to write dump {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A per-stream statistics storage taking part in the round lifecycle.
pub trait StatsStorage {
    /// Section name in the dump.
    fn name(&self) -> &'static str;

    /// Prepare the stream for the next round.
    fn reset(&mut self, stream: &StreamKey);

    /// Serialize the stream's current values into `dump`.
    fn dump(&self, stream: &StreamKey, dump: &mut IniDump);
}

/// Render a value for the dump, with zero and empty values as [`UNKNOWN_VALUE`].
pub fn dump_value<T: fmt::Display>(value: T) -> String {
    let value = value.to_string();
    if value.is_empty() || value == "0" {
        UNKNOWN_VALUE.to_string()
    } else {
        value
    }
}
