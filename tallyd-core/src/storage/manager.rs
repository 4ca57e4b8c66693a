use crate::storage::counters::{
    MetadataStorage, PatternsStorage, RecordsStorage, ResponseCodesStorage,
};
use crate::storage::dump::IniDump;
use crate::storage::methods::{CalledMethodStorage, MethodDumpSettings};
use crate::storage::types::{StatsStorage, StorageError, StreamKey};
use std::path::Path;

/// What the storages need from configuration.
#[derive(Debug, Clone, Default)]
pub struct StorageSettings {
    pub permanent_codes: Vec<u16>,
    pub percentiles: Vec<u8>,
    pub stalled_threshold: u64,
    pub pattern_names: Vec<String>,
}

/// Owns every statistics storage and drives their round lifecycle.
#[derive(Debug, Clone, Default)]
pub struct StorageManager {
    pub metadata: MetadataStorage,
    pub records: RecordsStorage,
    pub response_codes: ResponseCodesStorage,
    pub patterns: PatternsStorage,
    pub methods: CalledMethodStorage,
}

impl StorageManager {
    pub fn new(settings: StorageSettings) -> Self {
        Self {
            metadata: MetadataStorage::default(),
            records: RecordsStorage::default(),
            response_codes: ResponseCodesStorage::new(settings.permanent_codes.clone()),
            patterns: PatternsStorage::new(settings.pattern_names),
            methods: CalledMethodStorage::new(MethodDumpSettings {
                percentiles: settings.percentiles,
                stalled_threshold: settings.stalled_threshold,
                permanent_codes: settings.permanent_codes,
            }),
        }
    }

    /// Storages in dump order.
    fn storages(&self) -> [&dyn StatsStorage; 5] {
        [
            &self.metadata,
            &self.records,
            &self.response_codes,
            &self.patterns,
            &self.methods,
        ]
    }

    pub fn reset(&mut self, stream: &StreamKey) {
        self.metadata.reset(stream);
        self.records.reset(stream);
        self.response_codes.reset(stream);
        self.patterns.reset(stream);
        self.methods.reset(stream);
    }

    pub fn dump(&self, stream: &StreamKey) -> IniDump {
        let mut dump = IniDump::new();
        for storage in self.storages() {
            storage.dump(stream, &mut dump);
        }
        dump
    }

    pub fn persist(&self, stream: &StreamKey, path: &Path) -> Result<(), StorageError> {
        self.dump(stream).persist(path)?;
        tracing::debug!(stream = %stream, path = %path.display(), "dump written");
        Ok(())
    }
}
