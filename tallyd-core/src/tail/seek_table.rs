use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Last known read offset per concrete file path.
///
/// Kept in memory only; after a restart offsets are bootstrapped again.
#[derive(Debug, Clone, Default)]
pub struct SeekTable {
    seeks: HashMap<PathBuf, u64>,
}

impl SeekTable {
    pub fn get(&self, path: &Path) -> Option<u64> {
        self.seeks.get(path).copied()
    }

    pub fn set(&mut self, path: &Path, seek: u64) {
        self.seeks.insert(path.to_path_buf(), seek);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.seeks.contains_key(path)
    }

    /// Keep only the paths for which `keep` holds.
    pub fn retain(&mut self, mut keep: impl FnMut(&Path) -> bool) {
        self.seeks.retain(|path, _| keep(path));
    }

    pub fn len(&self) -> usize {
        self.seeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeks.is_empty()
    }
}
