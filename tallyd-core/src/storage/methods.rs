use crate::storage::counters::dump_response_codes;
use crate::storage::dump::IniDump;
use crate::storage::store::Storage;
use crate::storage::types::{StatsStorage, StorageError, StreamKey, dump_value};
use std::collections::BTreeMap;

/// Latencies and response codes of requests classified as one method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalledMethod {
    pub name: String,
    /// Latencies in milliseconds, kept sorted.
    pub calls: Vec<u64>,
    pub response_codes: BTreeMap<u16, u64>,
}

impl CalledMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_call(&mut self, latency: u64) {
        let at = self.calls.partition_point(|&call| call <= latency);
        self.calls.insert(at, latency);
    }

    pub fn num_calls(&self) -> u64 {
        self.calls.len() as u64
    }

    /// Linear interpolation between the floor and ceil ranks of
    /// `(n - 1) * percent / 100`, rounded half up. Zero when empty.
    pub fn percentile(&self, percent: u8) -> u64 {
        let Some(last) = self.calls.len().checked_sub(1) else {
            return 0;
        };

        let rank = last as u128 * u128::from(percent.min(100));
        let floor = (rank / 100) as usize;
        let weight = rank % 100;
        if weight == 0 {
            return self.calls[floor];
        }

        let low = u128::from(self.calls[floor]);
        let high = u128::from(self.calls[floor + 1]);
        ((low * (100 - weight) + high * weight + 50) / 100) as u64
    }

    /// Calls strictly slower than `threshold`.
    pub fn stalled(&self, threshold: u64) -> u64 {
        let fast = self.calls.partition_point(|&call| call <= threshold);
        (self.calls.len() - fast) as u64
    }

    pub fn min(&self) -> u64 {
        self.calls.first().copied().unwrap_or(0)
    }

    pub fn max(&self) -> u64 {
        self.calls.last().copied().unwrap_or(0)
    }

    /// Truncating mean.
    pub fn avg(&self) -> u64 {
        if self.calls.is_empty() {
            return 0;
        }
        let sum: u128 = self.calls.iter().map(|&call| u128::from(call)).sum();
        (sum / self.calls.len() as u128) as u64
    }
}

/// Settings shaping the per-method section of the dump.
#[derive(Debug, Clone, Default)]
pub struct MethodDumpSettings {
    pub percentiles: Vec<u8>,
    pub stalled_threshold: u64,
    pub permanent_codes: Vec<u16>,
}

#[derive(Debug, Clone, Default)]
pub struct CalledMethodStorage {
    methods: Storage<String, CalledMethod>,
    settings: MethodDumpSettings,
}

impl CalledMethodStorage {
    pub fn new(mut settings: MethodDumpSettings) -> Self {
        settings.percentiles.retain(|p| *p <= 100);
        settings.percentiles.sort_unstable();
        settings.percentiles.dedup();
        Self {
            methods: Storage::default(),
            settings,
        }
    }

    pub fn get(&self, stream: &StreamKey, method_id: &str) -> Result<&CalledMethod, StorageError> {
        self.methods.get(stream, &method_id.to_string())
    }

    pub fn method_ids(&self, stream: &StreamKey) -> Vec<&str> {
        self.methods
            .stream(stream)
            .map(|methods| methods.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Record one call, creating the method with the permanent codes on first sight.
    pub fn record(&mut self, stream: &StreamKey, method_id: &str, latency: u64, code: u16) {
        let methods = self.methods.stream_mut(stream);
        if !methods.contains_key(method_id) {
            let mut method = CalledMethod::new(method_id);
            seed_codes(&mut method, &self.settings.permanent_codes);
            methods.insert(method_id.to_string(), method);
        }
        let Some(method) = methods.get_mut(method_id) else {
            return;
        };

        method.add_call(latency);
        *method.response_codes.entry(code).or_insert(0) += 1;
    }
}

fn seed_codes(method: &mut CalledMethod, codes: &[u16]) {
    for code in codes {
        method.response_codes.insert(*code, 0);
    }
}

impl StatsStorage for CalledMethodStorage {
    fn name(&self) -> &'static str {
        "methods"
    }

    /// Forget latencies but keep known method names, so their sections stay
    /// in the dump across quiet rounds.
    fn reset(&mut self, stream: &StreamKey) {
        let methods = self.methods.stream_mut(stream);
        methods.retain(|_, method| !method.name.is_empty());
        for method in methods.values_mut() {
            method.calls.clear();
            method.response_codes.values_mut().for_each(|count| *count = 0);
            seed_codes(method, &self.settings.permanent_codes);
        }
    }

    fn dump(&self, stream: &StreamKey, dump: &mut IniDump) {
        let threshold = self.settings.stalled_threshold;

        for method in self.methods.stream(stream).into_iter().flat_map(|m| m.values()) {
            let section = format!("method_{}", method.name);
            dump.add_section(&section);
            dump.set(&section, "calls", dump_value(method.num_calls()));
            dump.set(&section, "stalled_calls", dump_value(method.stalled(threshold)));
            dump.set(&section, "shortest", dump_value(method.min()));
            dump.set(&section, "longest", dump_value(method.max()));
            dump.set(&section, "average", dump_value(method.avg()));

            for p in &self.settings.percentiles {
                dump.set(&section, &format!("p{p}"), dump_value(method.percentile(*p)));
            }

            dump_response_codes(dump, &section, Some(&method.response_codes));
        }
    }
}
