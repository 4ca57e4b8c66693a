use crate::conf::{RuntimeConfig, parse_config, validate_config};
use crate::storage::{FIRST_RECORD, LAST_RECORD, StreamKey};
use crate::tail::RoundProcessor;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2013, 8, 8)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn line(ts: NaiveDateTime, target: &str, status: u16, latency_us: u64) -> String {
    format!(
        "10.0.0.1 - - [{}] \"GET {target} HTTP/1.1\" {status} 512 \"-\" \"curl/8.0\" {latency_us}\n",
        ts.format("%d/%b/%Y:%H:%M:%S +0200")
    )
}

fn config(dir: &Path, input: &str) -> RuntimeConfig {
    let raw = format!(
        r#"
interval = 300
response_codes = [200, 500]
latency_percentiles = [50]
valid_requests = ['^/data/(?P<group>\w+)/(?P<method>\w+)']
skip_requests = ['^/health']

[[patterns]]
name = "uid"
patterns = ['uid=(?P<pattern>\w+)']

[[streams]]
input = "{input}"
output = "{output}"
"#,
        input = dir.join(input).display(),
        output = dir.join("apache.dump").display(),
    );
    validate_config(&parse_config(&raw, Path::new("tallyd.toml")).unwrap()).unwrap()
}

struct Fixture {
    dir: TempDir,
    processor: RoundProcessor,
}

impl Fixture {
    fn new(input: &str) -> Self {
        Self::starting_at(input, base() + Duration::minutes(5))
    }

    /// First round covers the interval ending at `now`.
    fn starting_at(input: &str, now: NaiveDateTime) -> Self {
        let dir = tempdir().unwrap();
        let processor = RoundProcessor::new(&config(dir.path(), input), now);
        Self { dir, processor }
    }

    fn write(&self, name: &str, lines: &[String]) {
        fs::write(self.path(name), lines.concat()).unwrap();
    }

    fn method_ids(&self) -> Vec<String> {
        let key = self.key();
        let ids = self.processor.storages().methods.method_ids(&key);
        ids.into_iter().map(str::to_string).collect()
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn key(&self) -> StreamKey {
        StreamKey::from(self.path("apache.dump").as_path())
    }

    fn records(&self, status: &'static str) -> u64 {
        self.processor.storages().records.get(&self.key(), status).unwrap()
    }

    fn dump(&self) -> String {
        fs::read_to_string(self.path("apache.dump")).unwrap()
    }
}

#[test]
fn round_counts_every_line_by_status() {
    // Arrange
    let mut fixture = Fixture::new("access.log");
    let lines = [
        line(base() + Duration::seconds(1), "/data/api/user?uid=alice", 200, 12_000),
        line(base() + Duration::seconds(2), "/data/api/user?uid=bob", 500, 30_000),
        line(base() + Duration::seconds(3), "/health", 200, 100),
        line(base() + Duration::seconds(4), "/elsewhere", 200, 100),
        "garbage\n".to_string(),
    ];
    fs::write(fixture.path("access.log"), lines.concat()).unwrap();

    // Act
    let summary = fixture.processor.run_round(base() + Duration::minutes(5));

    // Assert
    assert_eq!(summary.failed, 0);
    assert_eq!(fixture.records("total"), 5);
    assert_eq!(fixture.records("parsed"), 2);
    assert_eq!(fixture.records("skipped"), 1);
    assert_eq!(fixture.records("error"), 2);

    let storages = fixture.processor.storages();
    let method = storages.methods.get(&fixture.key(), "api_user").unwrap();
    assert_eq!(method.calls, vec![12, 30]);
    assert_eq!(storages.response_codes.get(&fixture.key(), 500).unwrap(), 1);
    assert_eq!(storages.patterns.distinct(&fixture.key(), "uid"), 2);
    assert_eq!(
        storages.metadata.get(&fixture.key(), FIRST_RECORD).unwrap(),
        "2013-08-08 10:00:01"
    );
    assert_eq!(
        storages.metadata.get(&fixture.key(), LAST_RECORD).unwrap(),
        "2013-08-08 10:00:02"
    );

    let dump = fixture.dump();
    assert!(dump.contains("[method_api_user]\ncalls = 2\n"));
    assert!(dump.contains("uid.total = 2\n"));
}

#[test]
fn records_outside_the_period_are_left_alone() {
    // Arrange
    let mut fixture = Fixture::new("access.log");
    let before = line(base() - Duration::seconds(1), "/data/api/old", 200, 1000);
    let inside = line(base() + Duration::seconds(10), "/data/api/now", 200, 1000);
    let after = line(base() + Duration::minutes(5), "/data/api/next", 200, 1000);
    let content = [before.as_str(), inside.as_str(), after.as_str()].concat();
    fs::write(fixture.path("access.log"), content).unwrap();

    // Act
    fixture.processor.run_round(base() + Duration::minutes(5));

    // Assert
    assert_eq!(fixture.records("parsed"), 1);
    assert!(fixture.processor.storages().methods.get(&fixture.key(), "api_now").is_ok());
    let seek = fixture.processor.seeks().get(&fixture.path("access.log"));
    assert_eq!(seek, Some((before.len() + inside.len()) as u64));
}

#[test]
fn next_round_resumes_from_the_seek() {
    // Arrange
    let mut fixture = Fixture::new("access.log");
    let first = line(base() + Duration::seconds(10), "/data/api/first", 200, 1000);
    let second = line(base() + Duration::minutes(6), "/data/api/second", 200, 1000);
    let content = [first.as_str(), second.as_str()].concat();
    fs::write(fixture.path("access.log"), content).unwrap();
    fixture.processor.run_round(base() + Duration::minutes(5));

    // Act
    fixture.processor.run_round(base() + Duration::minutes(10));

    // Assert
    assert_eq!(fixture.records("parsed"), 1);
    let methods = fixture.processor.storages().methods.method_ids(&fixture.key());
    assert_eq!(methods, vec!["api_first", "api_second"]);
    let first = fixture.processor.storages().methods.get(&fixture.key(), "api_first");
    assert!(first.unwrap().calls.is_empty());
}

#[test]
fn incomplete_trailing_line_waits_for_the_next_round() {
    // Arrange
    let mut fixture = Fixture::new("access.log");
    let complete = line(base() + Duration::seconds(10), "/data/api/done", 200, 1000);
    let partial = line(base() + Duration::seconds(20), "/data/api/half", 200, 1000);
    let (head, tail) = partial.split_at(30);
    fs::write(fixture.path("access.log"), [complete.as_str(), head].concat()).unwrap();

    // Act
    fixture.processor.run_round(base() + Duration::minutes(5));
    fs::write(fixture.path("access.log"), [complete.as_str(), head, tail].concat()).unwrap();
    fixture.processor.run_round(base() + Duration::minutes(10));

    // Assert
    assert_eq!(fixture.records("total"), 1);
    assert!(fixture.processor.storages().methods.get(&fixture.key(), "api_half").is_ok());
}

#[test]
fn missing_input_still_writes_a_dump() {
    // Arrange
    let mut fixture = Fixture::new("absent.log");

    // Act
    let summary = fixture.processor.run_round(base() + Duration::minutes(5));

    // Assert
    assert_eq!(summary.streams, 1);
    assert_eq!(summary.failed, 1);
    assert!(fixture.dump().contains("[records]\nerror = U\nparsed = U\nskipped = U\ntotal = U\n"));
}

#[test]
fn period_advances_after_every_round() {
    let mut fixture = Fixture::new("absent.log");

    fixture.processor.run_round(base() + Duration::minutes(5));
    fixture.processor.run_round(base() + Duration::minutes(11));

    let period = fixture.processor.period();
    assert_eq!(period.start, base() + Duration::minutes(5));
    assert_eq!(period.end, base() + Duration::minutes(11));
}

#[test]
fn shifted_template_moves_file_name_and_bounds() {
    // Arrange
    let mut fixture = Fixture::new("access-%H.log?ts=-3600");
    fixture.write(
        "access-09.log",
        &[
            line(base() - Duration::minutes(61), "/data/api/early", 200, 1000),
            line(base() - Duration::minutes(59), "/data/api/first", 200, 1000),
            line(base() - Duration::minutes(56), "/data/api/second", 200, 1000),
            line(base() - Duration::minutes(54), "/data/api/late", 200, 1000),
        ],
    );

    // Act
    fixture.processor.run_round(base() + Duration::minutes(5));

    // Assert
    assert_eq!(fixture.records("parsed"), 2);
    assert_eq!(fixture.method_ids(), vec!["api_first", "api_second"]);
}

#[test]
fn name_only_shift_keeps_record_bounds_unshifted() {
    // Arrange
    let mut fixture = Fixture::new("access-%H.log?ts=-3600&ts-name-only=true");
    fixture.write(
        "access-09.log",
        &[
            line(base() - Duration::minutes(30), "/data/api/early", 200, 1000),
            line(base() + Duration::minutes(1), "/data/api/first", 200, 1000),
            line(base() + Duration::minutes(4), "/data/api/second", 200, 1000),
            line(base() + Duration::minutes(6), "/data/api/late", 200, 1000),
        ],
    );

    // Act
    fixture.processor.run_round(base() + Duration::minutes(5));

    // Assert
    assert_eq!(fixture.records("parsed"), 2);
    assert_eq!(fixture.method_ids(), vec!["api_first", "api_second"]);
}

#[test]
fn missing_period_start_file_fails_the_stream_but_dumps() {
    // Arrange
    let start = base() + Duration::minutes(58);
    let mut fixture = Fixture::starting_at("access-%H.log", start + Duration::minutes(5));
    fixture.write(
        "access-11.log",
        &[line(start + Duration::minutes(3), "/data/api/after", 200, 1000)],
    );

    // Act
    let summary = fixture.processor.run_round(start + Duration::minutes(5));

    // Assert
    assert_eq!(summary.failed, 1);
    assert!(fixture.dump().contains("[records]\nerror = U\nparsed = U\nskipped = U\ntotal = U\n"));
    assert!(fixture.processor.seeks().is_empty());
}

#[test]
fn seeks_of_past_hourly_files_are_forgotten() {
    // Arrange
    let start = base() + Duration::minutes(58);
    let mut fixture = Fixture::starting_at("access-%H.log", start + Duration::minutes(5));
    fixture.write(
        "access-10.log",
        &[line(start + Duration::minutes(1), "/data/api/before", 200, 1000)],
    );
    fixture.write(
        "access-11.log",
        &[line(start + Duration::minutes(3), "/data/api/after", 200, 1000)],
    );
    fixture.processor.run_round(start + Duration::minutes(5));
    let crossing = fixture.processor.seeks().len();

    // Act
    fixture.processor.run_round(start + Duration::minutes(10));

    // Assert
    assert_eq!(crossing, 2);
    let seeks = fixture.processor.seeks();
    assert_eq!(seeks.len(), 1);
    assert!(!seeks.contains(&fixture.path("access-10.log")));
    assert!(seeks.contains(&fixture.path("access-11.log")));
}
