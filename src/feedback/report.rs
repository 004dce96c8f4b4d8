use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Status glyph of one manifest entry on the summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMark {
    Done,
    Open,
    /// Entry without text; not published.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordMark {
    Written,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileMark {
    Copied,
    Existing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionLevel {
    Low,
    Partial,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceRow {
    Manifest { name: String },
    Record { path: String, written: bool },
    RecordFile { name: String },
    Attachment { name: String, copied: bool },
    MissingText { key: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestSummary {
    pub path: PathBuf,
    pub done: usize,
    pub total: usize,
    pub skipped: usize,
}

impl ManifestSummary {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            done: 0,
            total: 0,
            skipped: 0,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.done as f64 / self.total as f64
        }
    }

    pub fn level(&self) -> CompletionLevel {
        let percentage = self.percentage();
        if percentage < 50.0 {
            CompletionLevel::Low
        } else if percentage < 100.0 {
            CompletionLevel::Partial
        } else {
            CompletionLevel::Complete
        }
    }
}

/// Everything one user's synchronization produced, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserReport {
    pub user: String,
    pub manifests: Vec<ManifestSummary>,
    pub entries: Vec<EntryMark>,
    pub records: Vec<RecordMark>,
    pub files: Vec<FileMark>,
    pub trace: Vec<TraceRow>,
}

impl UserReport {
    pub fn new<S: Into<String>>(user: S) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    pub fn written_count(&self) -> usize {
        self.records.iter().filter(|m| **m == RecordMark::Written).count()
    }

    pub fn unchanged_count(&self) -> usize {
        self.records.iter().filter(|m| **m == RecordMark::Unchanged).count()
    }

    pub fn copied_count(&self) -> usize {
        self.files.iter().filter(|m| **m == FileMark::Copied).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.iter().filter(|m| **m == EntryMark::Skipped).count()
    }
}

/// Destination path -> whether it was copied during this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyLedger {
    entries: BTreeMap<PathBuf, bool>,
}

impl CopyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, destination: PathBuf, copied: bool) {
        self.entries.insert(destination, copied);
    }

    pub fn was_copied(&self, destination: &Path) -> bool {
        self.entries.get(destination).copied().unwrap_or(false)
    }
}
