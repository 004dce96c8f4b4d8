use crate::archive::manifest::{ArchiveEntry, ArchiveManifest};
use crate::error::Result;
use chrono::{DateTime, Datelike, Local, Timelike};
use serde::Serialize;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Per-file notification emitted while an archive is written.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveEvent {
    Added {
        archive: String,
        name: String,
        index: usize,
        total: usize,
    },
    Missing {
        archive: String,
        source: PathBuf,
        index: usize,
        total: usize,
    },
    /// The source exists but is a directory or other non-regular file.
    NotAFile {
        archive: String,
        source: PathBuf,
        index: usize,
        total: usize,
    },
}

impl ArchiveEvent {
    /// 1-based position of the file and the number of listed files.
    pub fn position(&self) -> (usize, usize) {
        match self {
            ArchiveEvent::Added { index, total, .. }
            | ArchiveEvent::Missing { index, total, .. }
            | ArchiveEvent::NotAFile { index, total, .. } => (*index, *total),
        }
    }

    /// Share of the archive's listed files handled so far, skipped ones included.
    pub fn percentage(&self) -> f64 {
        let (index, total) = self.position();

        if total == 0 {
            100.0
        } else {
            100.0 * index as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    pub zip_path: PathBuf,
    pub files_added: usize,
    pub missing: Vec<PathBuf>,
    /// Listed sources that exist but are not regular files.
    pub not_files: Vec<PathBuf>,
    pub expected_size: u64,
    pub actual_size: u64,
}

impl ArchiveReport {
    pub fn display_name(&self) -> String {
        self.zip_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.zip_path.display().to_string())
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.not_files.is_empty()
    }
}

pub struct Archiver {
    base_directory: PathBuf,
    buffer_size: usize,
}

impl Archiver {
    pub fn new<P: Into<PathBuf>>(base_directory: P) -> Self {
        Self {
            base_directory: base_directory.into(),
            buffer_size: 64 * 1024,
        }
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Builds every archive of the manifest in order.
    pub fn run(
        &self,
        manifest: &ArchiveManifest,
        progress_callback: Option<&dyn Fn(&ArchiveEvent)>,
    ) -> Result<Vec<ArchiveReport>> {
        manifest
            .archives
            .iter()
            .map(|entry| self.create_archive(entry, progress_callback))
            .collect()
    }

    /// Creates (or overwrites) one archive. Missing sources are reported and skipped.
    pub fn create_archive(
        &self,
        entry: &ArchiveEntry,
        progress_callback: Option<&dyn Fn(&ArchiveEvent)>,
    ) -> Result<ArchiveReport> {
        let archive = entry.display_name();
        let total = entry.files.len();

        if let Some(parent) = entry.zip_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = fs::File::create(&entry.zip_path)?;
        let mut zip = ZipWriter::new(BufWriter::with_capacity(self.buffer_size, file));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut files_added = 0;
        let mut missing = Vec::new();
        let mut not_files = Vec::new();

        for (i, name) in entry.files.iter().enumerate() {
            let source = self.base_directory.join(name);

            let event = if source.is_file() {
                let name = archive_name(name);
                let file_options = match modified_time(&source) {
                    Some(time) => options.last_modified_time(time),
                    None => options,
                };

                zip.start_file(name.as_str(), file_options)?;
                let mut reader = BufReader::with_capacity(self.buffer_size, fs::File::open(&source)?);
                std::io::copy(&mut reader, &mut zip)?;
                files_added += 1;

                tracing::debug!("{}: added {}", archive, name);
                ArchiveEvent::Added {
                    archive: archive.clone(),
                    name,
                    index: i + 1,
                    total,
                }
            } else if source.exists() {
                tracing::debug!("{}: {} is not a file", archive, source.display());
                not_files.push(source.clone());
                ArchiveEvent::NotAFile {
                    archive: archive.clone(),
                    source,
                    index: i + 1,
                    total,
                }
            } else {
                tracing::debug!("{}: {} does not exist", archive, source.display());
                missing.push(source.clone());
                ArchiveEvent::Missing {
                    archive: archive.clone(),
                    source,
                    index: i + 1,
                    total,
                }
            };

            if let Some(callback) = progress_callback {
                callback(&event);
            }
        }

        let mut writer = zip.finish()?;
        std::io::Write::flush(&mut writer)?;
        drop(writer);

        let actual_size = fs::metadata(&entry.zip_path)?.len();
        tracing::info!(
            "{}: {} of {} files, {} bytes",
            archive,
            files_added,
            total,
            actual_size
        );

        Ok(ArchiveReport {
            zip_path: entry.zip_path.clone(),
            files_added,
            missing,
            not_files,
            expected_size: entry.size,
            actual_size,
        })
    }
}

fn modified_time(path: &Path) -> Option<zip::DateTime> {
    let modified: SystemTime = fs::metadata(path).ok()?.modified().ok()?;
    let local: DateTime<Local> = modified.into();

    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}

/// Stored entry name: `/`-separated, without `.` segments or leading separators.
fn archive_name(name: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
            Component::ParentDir => {
                if parts.last().is_some_and(|last| last != "..") {
                    parts.pop();
                } else {
                    parts.push("..".to_string());
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts.join("/")
}

/// Byte count as megabytes with one decimal place.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / 1024.0 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Read;
    use tempfile::TempDir;

    fn write_source(base: &Path, relative: &str, content: &str) {
        let path = base.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn archive_names(path: &Path) -> Vec<String> {
        let file = fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_archive_contains_declared_names() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("dist");
        write_source(&base, "index.html", "<html></html>");
        write_source(&base, "assets/app.js", "console.log(1)");

        let entry = ArchiveEntry {
            zip_path: temp_dir.path().join("out/site.zip"),
            files: vec!["index.html".to_string(), "assets/app.js".to_string()],
            size: 1024,
        };

        let report = Archiver::new(&base).create_archive(&entry, None).unwrap();

        assert_eq!(report.files_added, 2);
        assert!(report.is_complete());
        assert_eq!(report.expected_size, 1024);
        assert_eq!(report.actual_size, fs::metadata(&entry.zip_path).unwrap().len());
        assert_eq!(
            archive_names(&entry.zip_path),
            vec!["assets/app.js".to_string(), "index.html".to_string()]
        );

        let file = fs::File::open(&entry.zip_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut content = String::new();
        archive
            .by_name("assets/app.js")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "console.log(1)");
    }

    #[test]
    fn test_missing_file_is_reported_and_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("dist");
        write_source(&base, "a.txt", "a");
        write_source(&base, "c.txt", "c");

        let entry = ArchiveEntry {
            zip_path: temp_dir.path().join("partial.zip"),
            files: vec!["a.txt".to_string(), "b.txt".to_string(), "c.txt".to_string()],
            size: 0,
        };

        let events = RefCell::new(Vec::new());
        let callback = |event: &ArchiveEvent| events.borrow_mut().push(event.clone());
        let report = Archiver::new(&base)
            .create_archive(&entry, Some(&callback))
            .unwrap();

        assert_eq!(report.files_added, 2);
        assert_eq!(report.missing, vec![base.join("b.txt")]);
        assert_eq!(
            archive_names(&entry.zip_path),
            vec!["a.txt".to_string(), "c.txt".to_string()]
        );

        let events = events.into_inner();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], ArchiveEvent::Missing { index: 2, .. }));
        assert_eq!(format!("{:.1}", events[0].percentage()), "33.3");
        assert_eq!(events[2].percentage(), 100.0);
    }

    #[test]
    fn test_run_continues_after_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("dist");
        write_source(&base, "ok.txt", "ok");

        let manifest = ArchiveManifest {
            archives: vec![
                ArchiveEntry {
                    zip_path: temp_dir.path().join("first.zip"),
                    files: vec!["gone.txt".to_string()],
                    size: 10,
                },
                ArchiveEntry {
                    zip_path: temp_dir.path().join("second.zip"),
                    files: vec!["ok.txt".to_string()],
                    size: 10,
                },
            ],
            session_id: None,
        };

        let reports = Archiver::new(&base).run(&manifest, None).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].files_added, 0);
        assert_eq!(reports[0].missing.len(), 1);
        assert!(temp_dir.path().join("first.zip").exists());
        assert_eq!(archive_names(&temp_dir.path().join("second.zip")), vec!["ok.txt"]);
    }

    #[test]
    fn test_existing_archive_is_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("dist");
        write_source(&base, "new.txt", "new");
        let zip_path = temp_dir.path().join("site.zip");
        fs::write(&zip_path, "not a zip").unwrap();

        let entry = ArchiveEntry {
            zip_path: zip_path.clone(),
            files: vec!["new.txt".to_string()],
            size: 0,
        };
        Archiver::new(&base).create_archive(&entry, None).unwrap();

        assert_eq!(archive_names(&zip_path), vec!["new.txt"]);
    }

    #[test]
    fn test_entry_names_are_normalized() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("dist");
        write_source(&base, "index.html", "<html></html>");
        write_source(&base, "css/site.css", "body {}");

        let entry = ArchiveEntry {
            zip_path: temp_dir.path().join("site.zip"),
            files: vec!["./index.html".to_string(), "css//site.css".to_string()],
            size: 0,
        };
        Archiver::new(&base).create_archive(&entry, None).unwrap();

        assert_eq!(
            archive_names(&entry.zip_path),
            vec!["css/site.css".to_string(), "index.html".to_string()]
        );
        assert_eq!(archive_name("a/./b/../c.txt"), "a/c.txt");
        assert_eq!(archive_name("/abs/x.txt"), "abs/x.txt");
    }

    #[test]
    fn test_directory_is_reported_as_not_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("dist");
        write_source(&base, "assets/app.js", "1");

        let entry = ArchiveEntry {
            zip_path: temp_dir.path().join("site.zip"),
            files: vec!["assets".to_string(), "assets/app.js".to_string()],
            size: 0,
        };

        let events = RefCell::new(Vec::new());
        let callback = |event: &ArchiveEvent| events.borrow_mut().push(event.clone());
        let report = Archiver::new(&base)
            .create_archive(&entry, Some(&callback))
            .unwrap();

        assert!(report.missing.is_empty());
        assert_eq!(report.not_files, vec![base.join("assets")]);
        assert!(!report.is_complete());
        assert_eq!(report.files_added, 1);
        assert!(matches!(events.into_inner()[0], ArchiveEvent::NotAFile { index: 1, .. }));
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.0");
        assert_eq!(format_megabytes(1048576), "1.0");
        assert_eq!(format_megabytes(1572864), "1.5");
        assert_eq!(format_megabytes(52428), "0.0");
    }
}
