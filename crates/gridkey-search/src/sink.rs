//! Destinations for summary and match records.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use gridkey_error::{GridKeyError, Result};
use parking_lot::Mutex;
use serde::Serialize;

use crate::record::{ComboSummary, FinalRecord, MatchRecord, RunSummary};

/// Receives records as the search produces them. Shared by every worker, so
/// implementations serialize their own writes.
pub trait RecordSink: Sync {
    fn summary(&self, summary: &ComboSummary) -> Result<()>;

    fn matched(&self, record: &MatchRecord) -> Result<()>;

    fn finish(&self, totals: &RunSummary) -> Result<()>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn summary(&self, _summary: &ComboSummary) -> Result<()> {
        Ok(())
    }

    fn matched(&self, _record: &MatchRecord) -> Result<()> {
        Ok(())
    }

    fn finish(&self, _totals: &RunSummary) -> Result<()> {
        Ok(())
    }
}

/// One JSON object per line, appended to an existing file if present.
#[derive(Debug)]
struct JsonlFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlFile {
    fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    fn append<T: Serialize>(&self, record: &T) -> Result<()> {
        let mut line = serde_json::to_string(record).map_err(|err| {
            GridKeyError::Serialization(format!("{}: {err}", self.path.display()))
        })?;
        line.push('\n');
        // A single write per line keeps lines whole under concurrent workers.
        self.file.lock().write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Summary log plus match log; either may be absent.
#[derive(Debug, Default)]
pub struct JsonlSink {
    summaries: Option<JsonlFile>,
    matches: Option<JsonlFile>,
}

impl JsonlSink {
    pub fn open(summaries: Option<&Path>, matches: Option<&Path>) -> Result<Self> {
        Ok(Self {
            summaries: summaries.map(JsonlFile::open).transpose()?,
            matches: matches.map(JsonlFile::open).transpose()?,
        })
    }
}

impl RecordSink for JsonlSink {
    fn summary(&self, summary: &ComboSummary) -> Result<()> {
        self.summaries
            .as_ref()
            .map_or(Ok(()), |file| file.append(summary))
    }

    fn matched(&self, record: &MatchRecord) -> Result<()> {
        self.matches
            .as_ref()
            .map_or(Ok(()), |file| file.append(record))
    }

    fn finish(&self, totals: &RunSummary) -> Result<()> {
        self.summaries.as_ref().map_or(Ok(()), |file| {
            file.append(&FinalRecord {
                summary: totals.clone(),
            })
        })
    }
}
