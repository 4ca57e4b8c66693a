use crate::VERSION;
use crate::classify::{RequestStatus, RuleSet};
use crate::conf::RuntimeConfig;
use crate::record::{LineParser, LogRecord, parse_line};
use crate::seek::SeekLocator;
use crate::storage::{StorageManager, StreamKey};
use crate::tail::error::TailError;
use crate::tail::period::Period;
use crate::tail::seek_table::SeekTable;
use crate::tail::types::Stream;
use chrono::{Duration, NaiveDateTime};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::collections::HashSet;
use std::path::Path;

/// Outcome of one round across all streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub streams: usize,
    pub failed: usize,
}

/// Drives rounds over every configured stream.
pub struct RoundProcessor {
    streams: Vec<Stream>,
    period: Period,
    tailer: Tailer,
}

/// Where a file scan starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadFrom {
    Start,
    Seek,
}

/// Per-round reading and aggregation state, shared by all streams.
struct Tailer {
    parser: Box<dyn LineParser + Send>,
    rules: RuleSet,
    latency_in_millis: bool,
    storages: StorageManager,
    seeks: SeekTable,
    locator: SeekLocator,
}

impl RoundProcessor {
    /// A processor whose first round covers one interval before `now`.
    pub fn new(config: &RuntimeConfig, now: NaiveDateTime) -> Self {
        let interval = Duration::from_std(config.interval).unwrap_or(Duration::zero());
        Self {
            streams: config.streams.clone(),
            period: Period::ending_at(now - interval),
            tailer: Tailer {
                parser: Box::new(config.log_format.clone()),
                rules: config.rules.clone(),
                latency_in_millis: config.latency_in_millis,
                storages: StorageManager::new(config.storage.clone()),
                seeks: SeekTable::default(),
                locator: SeekLocator::default(),
            },
        }
    }

    pub fn with_locator(mut self, locator: SeekLocator) -> Self {
        self.tailer.locator = locator;
        self
    }

    pub fn with_parser(mut self, parser: Box<dyn LineParser + Send>) -> Self {
        self.tailer.parser = parser;
        self
    }

    pub fn storages(&self) -> &StorageManager {
        &self.tailer.storages
    }

    pub fn seeks(&self) -> &SeekTable {
        &self.tailer.seeks
    }

    /// The period covered by the most recent round.
    pub fn period(&self) -> Period {
        self.period
    }

    /// Process every stream for the period ending at `round_start`.
    ///
    /// A failing stream is logged and does not affect its siblings. Every
    /// stream is dumped, even when nothing could be read.
    pub fn run_round(&mut self, round_start: NaiveDateTime) -> RoundSummary {
        let period = self.period.next(round_start);
        tracing::info!(
            version = VERSION,
            period_start = %period.start,
            period_end = %period.end,
            "round started"
        );

        let mut summary = RoundSummary::default();
        for stream in &self.streams {
            summary.streams += 1;
            if let Err(err) = self.tailer.process_stream(period, stream) {
                summary.failed += 1;
                tracing::error!(
                    stream = %stream.output.display(),
                    error = %err,
                    "stream processing failed"
                );
            }
        }

        self.prune_seeks(period);
        self.period = period;
        tracing::info!(
            streams = summary.streams,
            failed = summary.failed,
            "round finished"
        );
        summary
    }

    /// Forget offsets of files no stream can resolve to any more.
    fn prune_seeks(&mut self, period: Period) {
        let mut live = HashSet::new();
        for stream in &self.streams {
            live.insert(stream.input.resolve(period.start));
            live.insert(stream.input.resolve(period.end));
            if let Some(previous) = &stream.previous {
                live.insert(previous.resolve(period.end));
            }
        }

        let before = self.tailer.seeks.len();
        self.tailer.seeks.retain(|path| live.contains(path));
        let dropped = before - self.tailer.seeks.len();
        if dropped > 0 {
            tracing::debug!(dropped, "forgot seeks of rotated files");
        }
    }
}

impl Tailer {
    fn process_stream(&mut self, period: Period, stream: &Stream) -> Result<(), TailError> {
        let key = stream.key();
        self.storages.reset(&key);
        self.storages
            .metadata
            .set_invocation(&key, VERSION, period.end);

        let read = self.read_stream(&key, period, stream);
        let dumped = self.storages.persist(&key, &stream.output);

        read?;
        dumped?;
        Ok(())
    }

    fn read_stream(
        &mut self,
        key: &StreamKey,
        period: Period,
        stream: &Stream,
    ) -> Result<(), TailError> {
        let period_file = stream.input.resolve(period.start);
        let round_file = stream.input.resolve(period.end);

        if !round_file.exists() {
            return Err(TailError::MissingInput { path: round_file });
        }
        if period_file != round_file && !period_file.exists() {
            return Err(TailError::MissingInput { path: period_file });
        }

        if !self.seeks.contains(&period_file) {
            let target = stream.input.time_bound(period.start);
            let seek = self.locate(&period_file, target)?;
            self.seeks.set(&period_file, seek);
        }

        let bound = stream.input.time_bound(period.end);

        if period_file != round_file {
            // Name-based rotation: finish the old file, then the new one up to the bound.
            self.parse_file(key, &period_file, ReadFrom::Seek, None)?;
            return self.parse_file(key, &round_file, ReadFrom::Start, Some(bound));
        }

        let size = round_file
            .metadata()
            .map_err(TailError::read(&round_file))?
            .len();
        let seek = self.seeks.get(&round_file).unwrap_or(0);
        let rotated = size < seek || seek == 0;

        if rotated {
            tracing::debug!(file = %round_file.display(), size, seek, "reading from the start");
            if let Some(previous) = &stream.previous {
                let replaced = previous.resolve(period.end);
                let target = previous.time_bound(period.start);
                self.drain_predecessor(key, &replaced, seek, target)?;
            }
        }

        let from = if rotated {
            ReadFrom::Start
        } else {
            ReadFrom::Seek
        };
        self.parse_file(key, &round_file, from, Some(bound))
    }

    /// Read the renamed file left behind by an in-place rotation to its end.
    fn drain_predecessor(
        &mut self,
        key: &StreamKey,
        replaced: &Path,
        seek: u64,
        target: NaiveDateTime,
    ) -> Result<(), TailError> {
        if !replaced.exists() {
            tracing::error!(
                file = %replaced.display(),
                "previous file is not found and will not be processed"
            );
            return Ok(());
        }

        // A non-zero seek on the current name is where the renamed content
        // was left. Otherwise an earlier drain already recorded its own seek.
        let seek = match (seek, self.seeks.get(replaced)) {
            (0, Some(drained)) => drained,
            (0, None) => self.locate(replaced, target)?,
            (seek, _) => seek,
        };
        self.seeks.set(replaced, seek);
        self.parse_file(key, replaced, ReadFrom::Seek, None)
    }

    fn locate(&self, path: &Path, target: NaiveDateTime) -> Result<u64, TailError> {
        self.locator
            .locate_file(path, target, self.parser.as_ref())
            .map_err(|source| TailError::Seek {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Feed the lines of `path` into the storages and record where reading
    /// stopped.
    ///
    /// Stops at end of file or at the first record not before `bound`. A
    /// bounded read is of the live file, so an incomplete trailing line is left
    /// for the next round. Unbounded reads are of files that have rotated away
    /// and consume everything.
    fn parse_file(
        &mut self,
        key: &StreamKey,
        path: &Path,
        from: ReadFrom,
        bound: Option<NaiveDateTime>,
    ) -> Result<(), TailError> {
        let file = File::open(path).map_err(TailError::read(path))?;
        let mut reader = BufReader::new(file);

        let mut offset = match from {
            ReadFrom::Start => 0,
            ReadFrom::Seek => self.seeks.get(path).unwrap_or(0),
        };
        reader
            .seek(SeekFrom::Start(offset))
            .map_err(TailError::read(path))?;
        tracing::debug!(file = %path.display(), seek = offset, ?bound, "reading file");

        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(TailError::read(path))?;
            if read == 0 {
                tracing::debug!(file = %path.display(), seek = offset, "reached end of file");
                break;
            }
            if bound.is_some() && line.last() != Some(&b'\n') {
                tracing::debug!(
                    file = %path.display(),
                    seek = offset,
                    "incomplete line left for the next round"
                );
                break;
            }

            let text = String::from_utf8_lossy(&line);
            match parse_line(&text, self.parser.as_ref(), self.latency_in_millis) {
                Ok(record) => {
                    if bound.is_some_and(|bound| !record.is_before(bound)) {
                        tracing::debug!(file = %path.display(), seek = offset, "reached end of period");
                        break;
                    }
                    self.process_record(key, &record);
                }
                Err(err) => {
                    tracing::warn!(
                        file = %path.display(),
                        error = %err,
                        line = %text.trim_end(),
                        "unparsable record"
                    );
                    self.storages.records.inc_total(key);
                    self.storages.records.inc(key, RequestStatus::Error);
                }
            }
            offset += read as u64;
        }

        self.seeks.set(path, offset);
        Ok(())
    }

    fn process_record(&mut self, key: &StreamKey, record: &LogRecord) {
        let request = self.rules.classify(&record.raw_request);
        self.storages.records.inc_total(key);
        self.storages.records.inc(key, request.status);

        if request.status != RequestStatus::Parsed {
            return;
        }

        self.storages.methods.record(
            key,
            request.method_id(),
            record.latency,
            record.response_code,
        );
        self.storages.response_codes.inc(key, record.response_code);
        self.storages.metadata.update_time(key, record.timestamp);
        for (name, value) in &request.patterns {
            self.storages.patterns.inc(key, name, value);
        }
    }
}
