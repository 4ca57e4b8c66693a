use integration_tests::harness::{DumpFile, StreamEntry, TestLogDir, init_test_tracing};
use pretty_assertions::assert_eq;
use tracing::Level;

mod common;

use common::{access_line, at, processor};

#[test]
fn in_place_rotation_drains_the_renamed_file_once() {
    // Arrange
    let logs = TestLogDir::new();
    logs.write(
        "access.log",
        &[
            access_line(at(10, 50), "/content/api/user", 200, 1_000),
            access_line(at(10, 56), "/content/api/user", 200, 10_000),
            access_line(at(10, 58), "/content/api/user", 200, 20_000),
        ],
    );
    let stream = StreamEntry::new("access.log", "apache.dump").with_previous("access.log.1");
    let config = logs.config(&[stream]);
    let mut processor = processor(&config, at(11, 0));
    processor.run_round(at(11, 0));

    logs.append(
        "access.log",
        &[
            access_line(at(11, 1), "/content/api/user", 200, 30_000),
            access_line(at(11, 2), "/content/api/search", 200, 5_000),
        ],
    );
    logs.rotate("access.log", "access.log.1");
    logs.write(
        "access.log",
        &[access_line(at(11, 3), "/content/api/user", 200, 40_000)],
    );

    // Act
    processor.run_round(at(11, 5));
    let rotated = DumpFile::read(&logs.path("apache.dump"));
    logs.append(
        "access.log",
        &[access_line(at(11, 6), "/content/api/user", 200, 60_000)],
    );
    processor.run_round(at(11, 10));
    let after = DumpFile::read(&logs.path("apache.dump"));

    // Assert
    assert_eq!(rotated.value("records", "parsed"), "3");
    assert_eq!(rotated.value("method_api_user", "calls"), "2");
    assert_eq!(rotated.value("method_api_user", "shortest"), "30");
    assert_eq!(rotated.value("method_api_user", "longest"), "40");
    assert_eq!(rotated.value("method_api_search", "calls"), "1");

    assert_eq!(after.value("records", "parsed"), "1");
    assert_eq!(after.value("method_api_user", "calls"), "1");
    assert_eq!(after.value("method_api_user", "shortest"), "60");
    assert_eq!(after.value("method_api_search", "calls"), "U");
}

#[test]
fn missing_renamed_file_is_reported_and_skipped() {
    // Arrange
    let events = init_test_tracing();
    let logs = TestLogDir::new();
    logs.write(
        "access.log",
        &[
            access_line(at(10, 50), "/content/api/user", 200, 1_000),
            access_line(at(10, 56), "/content/api/user", 200, 10_000),
            access_line(at(10, 58), "/content/api/user", 200, 20_000),
        ],
    );
    let stream = StreamEntry::new("access.log", "apache.dump").with_previous("access.log.1");
    let config = logs.config(&[stream]);
    let mut processor = processor(&config, at(11, 0));
    processor.run_round(at(11, 0));

    logs.rotate("access.log", "access.log.old");
    logs.write(
        "access.log",
        &[access_line(at(11, 3), "/content/api/user", 200, 40_000)],
    );

    // Act
    let summary = processor.run_round(at(11, 5));

    // Assert
    assert_eq!(summary.failed, 0);
    let dump = DumpFile::read(&logs.path("apache.dump"));
    assert_eq!(dump.value("records", "parsed"), "1");
    assert_eq!(dump.value("method_api_user", "longest"), "40");

    let renamed = logs.path("access.log.1").display().to_string();
    let reports = events.matching(|e| {
        e.level == Level::ERROR && e.field("file") == Some(renamed.as_str())
    });
    assert_eq!(reports.len(), 1);
    assert_eq!(
        reports[0].message(),
        "previous file is not found and will not be processed"
    );
}

#[test]
fn hourly_files_are_joined_across_the_hour() {
    // Arrange
    let logs = TestLogDir::new();
    logs.write(
        "access-10.log",
        &[
            access_line(at(10, 57), "/content/api/early", 200, 1_000),
            access_line(at(10, 59), "/content/api/before", 200, 1_000),
        ],
    );
    logs.write(
        "access-11.log",
        &[
            access_line(at(11, 1), "/content/api/after", 200, 1_000),
            access_line(at(11, 4), "/content/api/later", 200, 1_000),
        ],
    );
    let config = logs.config(&[StreamEntry::new("access-%H.log", "hourly.dump")]);
    let mut processor = processor(&config, at(11, 3));

    // Act
    processor.run_round(at(11, 3));
    let crossing = DumpFile::read(&logs.path("hourly.dump"));
    processor.run_round(at(11, 8));
    let next = DumpFile::read(&logs.path("hourly.dump"));

    // Assert
    assert_eq!(crossing.value("records", "parsed"), "2");
    assert_eq!(crossing.value("method_api_before", "calls"), "1");
    assert_eq!(crossing.value("method_api_after", "calls"), "1");
    assert_eq!(crossing.get("method_api_early", "calls"), None);
    assert_eq!(crossing.get("method_api_later", "calls"), None);

    assert_eq!(next.value("records", "parsed"), "1");
    assert_eq!(next.value("method_api_later", "calls"), "1");
    assert_eq!(next.value("method_api_after", "calls"), "U");
}

#[test]
fn renamed_file_is_not_recounted_after_an_empty_replacement() {
    // Arrange
    let logs = TestLogDir::new();
    logs.write(
        "access.log",
        &[
            access_line(at(10, 50), "/content/api/user", 200, 1_000),
            access_line(at(10, 56), "/content/api/user", 200, 10_000),
        ],
    );
    let stream = StreamEntry::new("access.log", "apache.dump").with_previous("access.log.1");
    let config = logs.config(&[stream]);
    let mut processor = processor(&config, at(11, 0));
    processor.run_round(at(11, 0));

    logs.rotate("access.log", "access.log.1");
    logs.write("access.log", &[]);
    logs.append(
        "access.log.1",
        &[
            access_line(at(11, 2), "/content/api/late", 200, 2_000),
            access_line(at(11, 6), "/content/api/later", 200, 6_000),
        ],
    );

    // Act
    processor.run_round(at(11, 5));
    let drained = DumpFile::read(&logs.path("apache.dump"));
    logs.append(
        "access.log.1",
        &[access_line(at(11, 7), "/content/api/last", 200, 7_000)],
    );
    processor.run_round(at(11, 10));
    let again = DumpFile::read(&logs.path("apache.dump"));

    // Assert
    assert_eq!(drained.value("records", "parsed"), "2");
    assert_eq!(drained.value("method_api_late", "calls"), "1");
    assert_eq!(drained.value("method_api_later", "calls"), "1");

    assert_eq!(again.value("records", "parsed"), "1");
    assert_eq!(again.value("method_api_last", "calls"), "1");
    assert_eq!(again.get("method_api_later", "calls"), None);
}

#[test]
fn unterminated_last_line_of_a_finished_hour_is_counted() {
    // Arrange
    let logs = TestLogDir::new();
    let mut last = access_line(at(10, 59), "/content/api/before", 200, 1_000);
    last.truncate(last.trim_end().len());
    logs.write(
        "access-10.log",
        &[access_line(at(10, 57), "/content/api/early", 200, 1_000), last],
    );
    logs.write(
        "access-11.log",
        &[access_line(at(11, 1), "/content/api/after", 200, 1_000)],
    );
    let config = logs.config(&[StreamEntry::new("access-%H.log", "hourly.dump")]);
    let mut processor = processor(&config, at(11, 3));

    // Act
    processor.run_round(at(11, 3));
    let crossing = DumpFile::read(&logs.path("hourly.dump"));
    processor.run_round(at(11, 8));
    let next = DumpFile::read(&logs.path("hourly.dump"));

    // Assert
    assert_eq!(crossing.value("records", "parsed"), "2");
    assert_eq!(crossing.value("method_api_before", "calls"), "1");
    assert_eq!(crossing.value("method_api_after", "calls"), "1");

    assert_eq!(next.value("records", "total"), "U");
}

#[test]
fn unterminated_last_line_of_a_renamed_file_is_counted() {
    // Arrange
    let logs = TestLogDir::new();
    logs.write(
        "access.log",
        &[
            access_line(at(10, 50), "/content/api/user", 200, 1_000),
            access_line(at(10, 56), "/content/api/user", 200, 10_000),
        ],
    );
    let stream = StreamEntry::new("access.log", "apache.dump").with_previous("access.log.1");
    let config = logs.config(&[stream]);
    let mut processor = processor(&config, at(11, 0));
    processor.run_round(at(11, 0));

    let mut last = access_line(at(11, 1), "/content/api/search", 200, 5_000);
    last.truncate(last.trim_end().len());
    logs.append("access.log", &[last]);
    logs.rotate("access.log", "access.log.1");
    logs.write(
        "access.log",
        &[access_line(at(11, 3), "/content/api/user", 200, 40_000)],
    );

    // Act
    processor.run_round(at(11, 5));

    // Assert
    let dump = DumpFile::read(&logs.path("apache.dump"));
    assert_eq!(dump.value("records", "parsed"), "2");
    assert_eq!(dump.value("method_api_search", "calls"), "1");
    assert_eq!(dump.value("method_api_user", "calls"), "1");
}
