use crate::storage::StreamKey;
use crate::template::FileTemplate;
use std::path::PathBuf;

/// One input log, with its optional in-place rotation predecessor, feeding
/// one dump file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub input: FileTemplate,
    pub previous: Option<FileTemplate>,
    pub output: PathBuf,
}

impl Stream {
    pub fn key(&self) -> StreamKey {
        StreamKey::from(self.output.as_path())
    }
}
