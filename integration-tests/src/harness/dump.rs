use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A dump file read back for assertions.
#[derive(Debug, Clone, Default)]
pub struct DumpFile {
    sections: Vec<String>,
    values: BTreeMap<String, BTreeMap<String, String>>,
}

impl DumpFile {
    pub fn read(path: &Path) -> Self {
        let text = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("failed to read dump {}: {e}", path.display()));
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Self {
        let mut dump = Self::default();
        let mut current = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                dump.sections.push(name.to_string());
                dump.values.entry(name.to_string()).or_default();
                current = Some(name.to_string());
                continue;
            }

            let (key, value) = line
                .split_once(" = ")
                .unwrap_or_else(|| panic!("malformed dump line '{line}'"));
            let section = current
                .as_ref()
                .unwrap_or_else(|| panic!("option '{key}' outside of a section"));
            dump.values
                .entry(section.clone())
                .or_default()
                .insert(key.to_string(), value.to_string());
        }
        dump
    }

    /// Section names in file order.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.values.get(section)?.get(key).map(String::as_str)
    }

    /// Shorthand for a value that must be present.
    pub fn value(&self, section: &str, key: &str) -> &str {
        self.get(section, key)
            .unwrap_or_else(|| panic!("dump has no [{section}] {key}"))
    }
}
