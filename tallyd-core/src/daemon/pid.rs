use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A pid file holding the current process id, removed again on drop.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn create(path: &Path) -> Result<Self> {
        fs::write(path, format!("{}\n", std::process::id()))
            .with_context(|| format!("failed to write pid file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        remove_pid(&self.path);
    }
}

/// Best-effort removal, also used from the signal handler where drops never run.
pub fn remove_pid(path: &Path) {
    let _ = fs::remove_file(path);
}
