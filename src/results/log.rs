//! Append-only CSV result log
//!
//! Layout: one header row (feature names, prediction, timestamp), then one
//! row per prediction. The header is written once, when the file is created
//! or found empty, and every later append must carry the same header.
//!
//! A log that cannot be parsed is deleted on read and reported as a
//! warning; the next append starts a fresh file. There is no locking: a
//! single serving process is assumed.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::errors::{ResultLogError, ResultLogResult};
use super::record::PredictionRecord;
use super::{PREDICTION_COLUMN, TIMESTAMP_COLUMN};
use crate::observability::{log_event, Event};

/// What an append did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// File was created with a header and the first row
    Created,
    /// One row was appended to an existing log
    Appended,
}

/// Records read from the log, plus the warning raised while reading
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSnapshot {
    pub records: Vec<PredictionRecord>,
    pub warning: Option<ResultLogError>,
}

impl LogSnapshot {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Handle on the result log file
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record.
    ///
    /// Creates the log with a header when it is absent, empty or holds only
    /// blank lines. Otherwise
    /// the existing header must equal `record.header()`, or nothing is
    /// written and `HeaderMismatch` is returned.
    pub fn append(&self, record: &PredictionRecord) -> ResultLogResult<AppendOutcome> {
        let header = record.header();
        let row = record.to_row();

        let existing_len = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => return Err(self.write_failed(e)),
        };

        if existing_len == 0 {
            return self.create_log(&header, &row);
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_failed(e))?;

        let found = read_header(&mut file).map_err(|e| self.write_failed(e))?;
        // blank lines only: no header was ever written
        if found.iter().all(|name| name.is_empty()) {
            drop(file);
            return self.create_log(&header, &row);
        }
        if found != header {
            return Err(ResultLogError::HeaderMismatch {
                path: self.path.display().to_string(),
                expected: header,
                found,
            });
        }

        // a previous writer may have stopped mid-line
        if !ends_with_newline(&mut file).map_err(|e| self.write_failed(e))? {
            file.write_all(b"\n").map_err(|e| self.write_failed(e))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(&row)
            .map_err(|e| self.write_failed(e))?;
        writer.flush().map_err(|e| self.write_failed(e))?;

        log_event(
            Event::LogAppended,
            &[("path", &self.path.display().to_string())],
        );
        Ok(AppendOutcome::Appended)
    }

    /// Reads every record in file order.
    ///
    /// An absent or empty log reads as empty with no warning. Unparseable
    /// content deletes the file and returns empty with a `Corrupted`
    /// warning.
    pub fn read_all(&self) -> LogSnapshot {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return LogSnapshot::default(),
            Err(e) => {
                return LogSnapshot {
                    records: Vec::new(),
                    warning: Some(ResultLogError::ReadFailed {
                        path: self.path.display().to_string(),
                        reason: e.to_string(),
                    }),
                }
            }
        };
        if bytes.is_empty() {
            return LogSnapshot::default();
        }

        match parse_log(&bytes) {
            Ok(records) => LogSnapshot {
                records,
                warning: None,
            },
            Err(reason) => {
                let reset = self.reset();
                let path = self.path.display().to_string();
                log_event(
                    Event::LogCorruptionReset,
                    &[
                        ("path", &path),
                        ("reason", &reason),
                        ("removed", if reset.is_ok() { "true" } else { "false" }),
                    ],
                );
                LogSnapshot {
                    records: Vec::new(),
                    warning: Some(ResultLogError::Corrupted { path, reason }),
                }
            }
        }
    }

    /// The `n` newest records; ties on timestamp go to the later-appended row
    pub fn most_recent(&self, n: usize) -> LogSnapshot {
        let mut snapshot = self.read_all();
        sort_newest_first(&mut snapshot.records);
        snapshot.records.truncate(n);
        snapshot
    }

    /// Writes the whole log, header included, to `writer`.
    ///
    /// Returns the number of records written and any read warning. An
    /// empty log writes nothing.
    pub fn export<W: Write>(&self, writer: W) -> ResultLogResult<(usize, Option<ResultLogError>)> {
        let snapshot = self.read_all();
        let Some(first) = snapshot.records.first() else {
            return Ok((0, snapshot.warning));
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer
            .write_record(first.header())
            .map_err(|e| ResultLogError::ExportFailed(e.to_string()))?;
        for record in &snapshot.records {
            csv_writer
                .write_record(record.to_row())
                .map_err(|e| ResultLogError::ExportFailed(e.to_string()))?;
        }
        csv_writer
            .flush()
            .map_err(|e| ResultLogError::ExportFailed(e.to_string()))?;

        Ok((snapshot.records.len(), snapshot.warning))
    }

    /// Deletes the log file; a missing file is not an error
    pub fn reset(&self) -> ResultLogResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.write_failed(e)),
        }
    }

    fn create_log(&self, header: &[String], row: &[String]) -> ResultLogResult<AppendOutcome> {
        self.create_with(header, row)?;
        log_event(
            Event::LogCreated,
            &[("path", &self.path.display().to_string())],
        );
        Ok(AppendOutcome::Created)
    }

    fn create_with(&self, header: &[String], row: &[String]) -> ResultLogResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_failed(e))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| self.write_failed(e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(header)
            .map_err(|e| self.write_failed(e))?;
        writer
            .write_record(row)
            .map_err(|e| self.write_failed(e))?;
        writer.flush().map_err(|e| self.write_failed(e))?;
        Ok(())
    }

    fn write_failed(&self, e: impl std::fmt::Display) -> ResultLogError {
        ResultLogError::WriteFailed {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

/// Stable newest-first ordering shared by the log and insights
pub fn sort_newest_first(records: &mut [PredictionRecord]) {
    // reversing first makes the stable sort put later rows ahead on ties
    records.reverse();
    records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}

fn read_header(file: &mut File) -> std::io::Result<Vec<String>> {
    file.seek(SeekFrom::Start(0))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(&mut *file);

    let mut record = csv::StringRecord::new();
    reader
        .read_record(&mut record)
        .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;
    Ok(record.iter().map(str::to_string).collect())
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.seek(SeekFrom::End(0))?;
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn parse_log(bytes: &[u8]) -> Result<Vec<PredictionRecord>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();

    for required in [PREDICTION_COLUMN, TIMESTAMP_COLUMN] {
        if !header.iter().any(|h| h == required) {
            return Err(format!("header has no '{}' column", required));
        }
    }

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result.map_err(|e| e.to_string())?;
        let record =
            PredictionRecord::from_row(&header, &row).map_err(|e| format!("row {}: {}", i + 2, e))?;
        records.push(record);
    }
    Ok(records)
}
