use crate::storage::{IniDump, dump_value};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

#[test]
fn zero_and_empty_values_are_unknown() {
    assert_eq!(dump_value(0), "U");
    assert_eq!(dump_value(""), "U");
    assert_eq!(dump_value(12), "12");
    assert_eq!(dump_value("0.3.1"), "0.3.1");
}

#[test]
fn sections_and_keys_keep_insertion_order() {
    // Arrange
    let mut dump = IniDump::new();

    // Act
    dump.set("records", "total", "4");
    dump.add_section("response_codes");
    dump.set("records", "error", "1");
    dump.set("records", "total", "5");

    // Assert
    assert_eq!(
        dump.section_names().collect::<Vec<_>>(),
        vec!["records", "response_codes"]
    );
    assert_eq!(
        dump.to_string(),
        "[records]\ntotal = 5\nerror = 1\n\n[response_codes]\n\n"
    );
    assert!(dump.has_option("records", "error"));
    assert!(!dump.has_option("response_codes", "rc200"));
}

#[test]
fn persist_replaces_the_previous_dump() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("apache.dump");
    fs::write(&path, "stale").unwrap();
    let mut dump = IniDump::new();
    dump.set("records", "total", "1");

    dump.persist(&path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "[records]\ntotal = 1\n\n");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn persist_into_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("apache.dump");

    assert!(IniDump::new().persist(&path).is_err());
}
