use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tallyd_core::conf::{ValidatedConfig, load_config};
use tempfile::TempDir;

const BASE_CONFIG: &str = "base.toml";

/// One `[[streams]]` entry, with file names relative to the log dir.
#[derive(Debug, Clone, Copy)]
pub struct StreamEntry<'a> {
    pub input: &'a str,
    pub previous: Option<&'a str>,
    pub output: &'a str,
}

impl<'a> StreamEntry<'a> {
    pub fn new(input: &'a str, output: &'a str) -> Self {
        Self {
            input,
            previous: None,
            output,
        }
    }

    pub fn with_previous(mut self, previous: &'a str) -> Self {
        self.previous = Some(previous);
        self
    }
}

/// A temporary directory holding access logs, dumps and the config.
pub struct TestLogDir {
    dir: TempDir,
}

impl Default for TestLogDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLogDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, lines: &[String]) {
        fs::write(self.path(name), lines.concat()).expect("failed to write log");
    }

    pub fn append(&self, name: &str, lines: &[String]) {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.path(name))
            .expect("failed to open log");
        file.write_all(lines.concat().as_bytes())
            .expect("failed to append to log");
    }

    /// Rename a log the way logrotate does before creating a fresh one.
    pub fn rotate(&self, from: &str, to: &str) {
        fs::rename(self.path(from), self.path(to)).expect("failed to rotate log");
    }

    /// Write the shared fixture plus `streams` as `tallyd.toml` and load it.
    pub fn config(&self, streams: &[StreamEntry<'_>]) -> ValidatedConfig {
        self.config_with(streams, "")
    }

    /// Like [`TestLogDir::config`], with extra top-level TOML.
    pub fn config_with(&self, streams: &[StreamEntry<'_>], extra: &str) -> ValidatedConfig {
        let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(BASE_CONFIG);
        let base = fs::read_to_string(&fixture).expect("failed to read base config");

        let mut raw = format!("{extra}\n{base}");
        for stream in streams {
            raw.push_str("\n[[streams]]\n");
            raw.push_str(&format!("input = '{}'\n", self.template(stream.input)));
            if let Some(previous) = stream.previous {
                raw.push_str(&format!("previous = '{}'\n", self.template(previous)));
            }
            raw.push_str(&format!("output = '{}'\n", self.path(stream.output).display()));
        }

        let path = self.path("tallyd.toml");
        fs::write(&path, raw).expect("failed to write config");
        load_config(&path).expect("test config should be valid")
    }

    fn template(&self, name: &str) -> String {
        format!("{}/{name}", self.dir.path().display())
    }
}
