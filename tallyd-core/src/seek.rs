//! Locating the first record of a period inside a large log file.
//!
//! Reading a multi-gigabyte log from the top on every start is not an
//! option, so the search runs in two phases:
//!
//! 1. step backwards from the end in fixed jumps until one lands on a
//!    record that is strictly older than the target;
//! 2. scan forward line by line from that jump to the first record that is
//!    not older than the target.
//!
//! Phase 1 never overshoots (it only accepts records before the target), so
//! phase 2 covers at most one jump worth of lines.

use crate::record::{LineParser, LogRecord, parse_line};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

pub const BYTES_IN_MB: u64 = 1024 * 1024;

/// Backward jump as a share of the file size, in percent.
pub const SEEK_BACKWARD_PERCENT: u64 = 1;

#[derive(Debug, Clone, Copy)]
pub struct SeekLocator {
    min_jump: u64,
}

impl Default for SeekLocator {
    fn default() -> Self {
        Self {
            min_jump: BYTES_IN_MB,
        }
    }
}

impl SeekLocator {
    /// A locator whose backward jumps are never shorter than `min_jump` bytes.
    pub fn with_min_jump(min_jump: u64) -> Self {
        Self {
            min_jump: min_jump.max(1),
        }
    }

    /// Offset of the first record at or after `target` in the file at `path`,
    /// or the file size when there is none.
    pub fn locate_file<P>(&self, path: &Path, target: NaiveDateTime, parser: &P) -> io::Result<u64>
    where
        P: LineParser + ?Sized,
    {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        tracing::debug!(file = %path.display(), size, %target, "locating seek");
        let seek = self.locate(&mut reader, size, target, parser)?;
        tracing::debug!(file = %path.display(), seek, "seek located");

        Ok(seek)
    }

    pub fn locate<R, P>(
        &self,
        reader: &mut R,
        size: u64,
        target: NaiveDateTime,
        parser: &P,
    ) -> io::Result<u64>
    where
        R: BufRead + Seek,
        P: LineParser + ?Sized,
    {
        let approximate = self.approximate(reader, size, target, parser)?;
        tracing::trace!(approximate, "approximate seek");
        exact(reader, approximate, target, parser)
    }

    /// Phase 1: offset of a line holding a record before `target`, or 0.
    fn approximate<R, P>(
        &self,
        reader: &mut R,
        size: u64,
        target: NaiveDateTime,
        parser: &P,
    ) -> io::Result<u64>
    where
        R: BufRead + Seek,
        P: LineParser + ?Sized,
    {
        for position in self.jump_positions(size) {
            reader.seek(SeekFrom::Start(position))?;
            // The jump most likely landed mid-line; skip to the next one.
            let mut fragment = Vec::new();
            reader.read_until(b'\n', &mut fragment)?;

            let candidate = reader.stream_position()?;
            if let Some(Some(record)) = read_record(reader, parser)? {
                if record.is_before(target) {
                    return Ok(candidate);
                }
            }
        }
        Ok(0)
    }

    fn jump_positions(&self, size: u64) -> Vec<u64> {
        let Some(last) = size.checked_sub(1) else {
            return Vec::new();
        };

        let jump = (last / 100 * SEEK_BACKWARD_PERCENT).max(self.min_jump);
        let mut positions = Vec::new();
        let mut current = last;
        while current > jump {
            current -= jump;
            positions.push(current);
        }
        positions
    }
}

/// Phase 2: start of the first line at or after `target`, or end of file.
fn exact<R, P>(reader: &mut R, start: u64, target: NaiveDateTime, parser: &P) -> io::Result<u64>
where
    R: BufRead + Seek,
    P: LineParser + ?Sized,
{
    reader.seek(SeekFrom::Start(start))?;
    loop {
        let candidate = reader.stream_position()?;
        match read_record(reader, parser)? {
            None => return reader.stream_position(),
            Some(Some(record)) if !record.is_before(target) => return Ok(candidate),
            // Older records and noise alike: keep going.
            Some(_) => continue,
        }
    }
}

/// `None` at end of file, `Some(None)` for a line that is not a record.
fn read_record<R, P>(reader: &mut R, parser: &P) -> io::Result<Option<Option<LogRecord>>>
where
    R: BufRead,
    P: LineParser + ?Sized,
{
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(
        parse_line(&String::from_utf8_lossy(&line), parser, false).ok(),
    ))
}
