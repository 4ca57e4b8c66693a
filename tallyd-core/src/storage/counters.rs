use crate::classify::RequestStatus;
use crate::record::RECORD_TIME_FORMAT;
use crate::storage::dump::IniDump;
use crate::storage::store::{CounterStorage, Storage};
use crate::storage::types::{StatsStorage, StorageError, StreamKey, dump_value};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

pub const DAEMON_VERSION: &str = "daemon_version";
pub const DAEMON_INVOKED: &str = "daemon_invoked";
pub const FIRST_RECORD: &str = "first_record";
pub const LAST_RECORD: &str = "last_record";

pub const TOTAL: &str = "total";

//----------------------------------------------------------------------------
// Metadata
//----------------------------------------------------------------------------

/// Daemon version, invocation time and the time span of records seen this round.
#[derive(Debug, Clone, Default)]
pub struct MetadataStorage {
    values: Storage<&'static str, String>,
}

impl MetadataStorage {
    pub fn get(&self, stream: &StreamKey, key: &'static str) -> Result<&str, StorageError> {
        self.values.get(stream, &key).map(String::as_str)
    }

    pub fn set_invocation(&mut self, stream: &StreamKey, version: &str, invoked: NaiveDateTime) {
        self.values.set(stream, DAEMON_VERSION, version.to_string());
        self.values.set(
            stream,
            DAEMON_INVOKED,
            invoked.format(RECORD_TIME_FORMAT).to_string(),
        );
    }

    /// Keep the first timestamp of the round and move the last one.
    pub fn update_time(&mut self, stream: &StreamKey, time: NaiveDateTime) {
        let time = time.format(RECORD_TIME_FORMAT).to_string();
        let values = self.values.stream_mut(stream);
        if values.get(FIRST_RECORD).is_none_or(String::is_empty) {
            values.insert(FIRST_RECORD, time.clone());
        }
        values.insert(LAST_RECORD, time);
    }
}

impl StatsStorage for MetadataStorage {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn reset(&mut self, stream: &StreamKey) {
        self.values.clear(stream);
    }

    fn dump(&self, stream: &StreamKey, dump: &mut IniDump) {
        dump_section(dump, self.name(), self.values.stream(stream));
    }
}

//----------------------------------------------------------------------------
// Records
//----------------------------------------------------------------------------

/// Line counts per classification status, plus `total`.
#[derive(Debug, Clone, Default)]
pub struct RecordsStorage {
    counts: CounterStorage<&'static str>,
}

impl RecordsStorage {
    const KEYS: [&'static str; 4] = ["parsed", "skipped", "error", TOTAL];

    pub fn get(&self, stream: &StreamKey, key: &'static str) -> Result<u64, StorageError> {
        self.counts.get(stream, &key).copied()
    }

    pub fn inc_total(&mut self, stream: &StreamKey) {
        self.counts.inc(stream, TOTAL);
    }

    pub fn inc(&mut self, stream: &StreamKey, status: RequestStatus) {
        self.counts.inc(stream, status.as_str());
    }
}

impl StatsStorage for RecordsStorage {
    fn name(&self) -> &'static str {
        "records"
    }

    fn reset(&mut self, stream: &StreamKey) {
        self.counts.zero(stream);
        for key in Self::KEYS {
            self.counts.set(stream, key, 0);
        }
    }

    fn dump(&self, stream: &StreamKey, dump: &mut IniDump) {
        dump_section(dump, self.name(), self.counts.stream(stream));
    }
}

//----------------------------------------------------------------------------
// Response codes
//----------------------------------------------------------------------------

/// Response code distribution. Permanent codes are always present so chart
/// columns stay stable.
#[derive(Debug, Clone, Default)]
pub struct ResponseCodesStorage {
    counts: CounterStorage<u16>,
    permanent: Vec<u16>,
}

impl ResponseCodesStorage {
    pub fn new(permanent: Vec<u16>) -> Self {
        Self {
            counts: CounterStorage::default(),
            permanent,
        }
    }

    pub fn get(&self, stream: &StreamKey, code: u16) -> Result<u64, StorageError> {
        self.counts.get(stream, &code).copied()
    }

    pub fn inc(&mut self, stream: &StreamKey, code: u16) {
        self.counts.inc(stream, code);
    }

    pub fn codes(&self, stream: &StreamKey) -> Vec<u16> {
        self.counts
            .stream(stream)
            .map(|codes| codes.keys().copied().collect())
            .unwrap_or_default()
    }
}

impl StatsStorage for ResponseCodesStorage {
    fn name(&self) -> &'static str {
        "response_codes"
    }

    fn reset(&mut self, stream: &StreamKey) {
        self.counts.zero(stream);
        for code in &self.permanent {
            self.counts.set(stream, *code, 0);
        }
    }

    fn dump(&self, stream: &StreamKey, dump: &mut IniDump) {
        dump_response_codes(dump, self.name(), self.counts.stream(stream));
    }
}

/// Write codes as `rc<code>` keys into `section`.
pub(crate) fn dump_response_codes(
    dump: &mut IniDump,
    section: &str,
    codes: Option<&BTreeMap<u16, u64>>,
) {
    dump.add_section(section);
    for (code, count) in codes.into_iter().flatten() {
        dump.set(section, &format!("rc{code}"), dump_value(count));
    }
}

//----------------------------------------------------------------------------
// Pattern matches
//----------------------------------------------------------------------------

/// Per extraction rule, a counter of each distinct matched value.
#[derive(Debug, Clone, Default)]
pub struct PatternsStorage {
    matches: Storage<String, BTreeMap<String, u64>>,
    names: Vec<String>,
}

impl PatternsStorage {
    /// `names` are the configured rules, dumped even when nothing matched.
    pub fn new(names: Vec<String>) -> Self {
        Self {
            matches: Storage::default(),
            names,
        }
    }

    pub fn inc(&mut self, stream: &StreamKey, name: &str, value: &str) {
        let rule = self
            .matches
            .stream_mut(stream)
            .entry(name.to_string())
            .or_default();
        *rule.entry(value.to_string()).or_insert(0) += 1;
    }

    pub fn total(&self, stream: &StreamKey, name: &str) -> u64 {
        self.matches
            .get(stream, &name.to_string())
            .map(|values| values.values().sum())
            .unwrap_or(0)
    }

    pub fn distinct(&self, stream: &StreamKey, name: &str) -> u64 {
        self.matches
            .get(stream, &name.to_string())
            .map(|values| values.len() as u64)
            .unwrap_or(0)
    }
}

impl StatsStorage for PatternsStorage {
    fn name(&self) -> &'static str {
        "patterns"
    }

    fn reset(&mut self, stream: &StreamKey) {
        self.matches.clear(stream);
    }

    fn dump(&self, stream: &StreamKey, dump: &mut IniDump) {
        let section = self.name();
        dump.add_section(section);

        let seen = self.matches.stream(stream).into_iter().flat_map(|m| m.keys());
        for name in seen {
            dump.set(section, &format!("{name}.total"), dump_value(self.total(stream, name)));
            dump.set(section, &format!("{name}.distinct"), dump_value(self.distinct(stream, name)));
        }

        for name in &self.names {
            let total = format!("{name}.total");
            if !dump.has_option(section, &total) {
                dump.set(section, &total, dump_value(0));
                dump.set(section, &format!("{name}.distinct"), dump_value(0));
            }
        }
    }
}

fn dump_section<K, V>(dump: &mut IniDump, section: &str, values: Option<&BTreeMap<K, V>>)
where
    K: std::fmt::Display,
    V: std::fmt::Display,
{
    dump.add_section(section);
    for (key, value) in values.into_iter().flatten() {
        dump.set(section, &key.to_string(), dump_value(value));
    }
}
