//! Per-stream statistics storages.
//!
//! Every storage keeps its values per [`StreamKey`]. At round start the
//! [`StorageManager`] resets a stream in all storages, at round end it dumps
//! all of them, in a stable order, into one [`IniDump`].

mod counters;
mod dump;
mod manager;
mod methods;
mod store;
mod types;

#[cfg(test)]
mod tests;

pub use counters::{
    DAEMON_INVOKED, DAEMON_VERSION, FIRST_RECORD, LAST_RECORD, MetadataStorage, PatternsStorage,
    RecordsStorage, ResponseCodesStorage, TOTAL,
};
pub use dump::IniDump;
pub use manager::{StorageManager, StorageSettings};
pub use methods::{CalledMethod, CalledMethodStorage, MethodDumpSettings};
pub use store::{CounterStorage, Storage};
pub use types::{StatsStorage, StorageError, StreamKey, UNKNOWN_VALUE, dump_value};
