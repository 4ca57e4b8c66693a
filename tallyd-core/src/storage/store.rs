use crate::storage::types::{StorageError, StreamKey};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// Two-level map: stream -> record key -> value.
///
/// Record keys are kept ordered so dumps come out sorted.
#[derive(Debug, Clone)]
pub struct Storage<K, V> {
    streams: HashMap<StreamKey, BTreeMap<K, V>>,
}

/// A storage of incrementing counters.
pub type CounterStorage<K> = Storage<K, u64>;

impl<K, V> Default for Storage<K, V> {
    fn default() -> Self {
        Self {
            streams: HashMap::new(),
        }
    }
}

impl<K, V> Storage<K, V>
where
    K: Ord + Display,
{
    pub fn get(&self, stream: &StreamKey, key: &K) -> Result<&V, StorageError> {
        self.streams
            .get(stream)
            .and_then(|values| values.get(key))
            .ok_or_else(|| StorageError::NotFound {
                stream: stream.clone(),
                key: key.to_string(),
            })
    }

    pub fn set(&mut self, stream: &StreamKey, key: K, value: V) {
        self.stream_mut(stream).insert(key, value);
    }

    pub fn stream(&self, stream: &StreamKey) -> Option<&BTreeMap<K, V>> {
        self.streams.get(stream)
    }

    /// Values of `stream`, created empty on first access.
    pub fn stream_mut(&mut self, stream: &StreamKey) -> &mut BTreeMap<K, V> {
        self.streams.entry(stream.clone()).or_default()
    }

    pub fn clear(&mut self, stream: &StreamKey) {
        self.stream_mut(stream).clear();
    }
}

impl<K> Storage<K, u64>
where
    K: Ord + Display,
{
    /// Add one to `key`, starting from zero.
    pub fn inc(&mut self, stream: &StreamKey, key: K) {
        *self.stream_mut(stream).entry(key).or_insert(0) += 1;
    }

    /// Keep every key of `stream` but set its value to zero.
    pub fn zero(&mut self, stream: &StreamKey) {
        self.stream_mut(stream)
            .values_mut()
            .for_each(|value| *value = 0);
    }
}
