use crate::config::FeedbackConfig;
use crate::error::{PublishError, Result};
use crate::feedback::manifest::FeedbackManifest;
use crate::feedback::options::UserOptions;
use crate::feedback::record::FeedbackRecord;
use crate::feedback::report::{
    CopyLedger, EntryMark, FileMark, ManifestSummary, RecordMark, TraceRow, UserReport,
};
use crate::scanner::{companion_files, AttachmentFilter, ManifestScanner};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

/// Outcome of writing one record file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// Content differed or the file did not exist.
    Written { path: PathBuf },
    /// Existing file already holds identical content.
    Unchanged { path: PathBuf },
}

impl WriteResult {
    pub fn was_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }
}

/// Publishes per-user feedback manifests into the public tree.
pub struct FeedbackSync {
    config: FeedbackConfig,
    scanner: ManifestScanner,
    filter: AttachmentFilter,
    buffer_size: usize,
}

impl FeedbackSync {
    pub fn new(config: &FeedbackConfig) -> Self {
        Self {
            config: config.clone(),
            scanner: ManifestScanner::new(config),
            filter: AttachmentFilter::new(config),
            buffer_size: 64 * 1024,
        }
    }

    pub fn public_directory(&self) -> &Path {
        &self.config.public_directory
    }

    /// Synchronizes every user directory directly below `root`, in name order.
    pub fn sync_all(&self, root: &Path) -> Result<Vec<UserReport>> {
        user_directories(root)?
            .iter()
            .map(|(user_dir, user_name)| self.sync_user(user_dir, user_name))
            .collect()
    }

    pub fn sync_user(&self, user_dir: &Path, user_name: &str) -> Result<UserReport> {
        let options = UserOptions::load(user_dir.join(&self.config.options_file))?;
        let mut report = UserReport::new(user_name);

        for manifest_path in self.scanner.manifests(user_dir) {
            let manifest_path = manifest_path?;
            self.process_manifest(&manifest_path, user_name, &options, &mut report)?;
        }

        tracing::info!(
            "{}: {} manifests, {} records written, {} unchanged, {} files copied",
            user_name,
            report.manifests.len(),
            report.written_count(),
            report.unchanged_count(),
            report.copied_count()
        );

        Ok(report)
    }

    fn process_manifest(
        &self,
        manifest_path: &Path,
        user_name: &str,
        options: &UserOptions,
        report: &mut UserReport,
    ) -> Result<()> {
        let manifest_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
        let files_dir = manifest_dir.join(&self.config.files_directory);

        let ledger = self.copy_companion_tree(&files_dir)?;
        let manifest = FeedbackManifest::load(manifest_path)?;

        report.trace.push(TraceRow::Manifest {
            name: manifest_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        });

        let mut summary = ManifestSummary::new(manifest_path.to_path_buf());

        for (key, entry) in &manifest.feedback {
            if !entry.has_text() {
                tracing::debug!("{}: feedback {} has no text", manifest_path.display(), key);
                summary.skipped += 1;
                report.entries.push(EntryMark::Skipped);
                report.trace.push(TraceRow::MissingText { key: key.clone() });
                continue;
            }

            summary.total += 1;
            if entry.is_done() {
                summary.done += 1;
                report.entries.push(EntryMark::Done);
            } else {
                report.entries.push(EntryMark::Open);
            }

            let files = self.filter.attachments_for(&files_dir, key)?;
            let record = FeedbackRecord::build(key, entry, options, files)?;
            let file_name = record.file_name(user_name, &self.config.record_extension);
            let record_path = self.record_directory(key)?.join(&file_name);

            let result = self.write_record(&record, &record_path)?;
            report.trace.push(TraceRow::Record {
                path: format!("{}/{}", key, file_name),
                written: result.was_written(),
            });
            report
                .trace
                .extend(record.files.iter().map(|name| TraceRow::RecordFile { name: name.clone() }));

            for name in &record.files {
                let destination = self.config.public_directory.join(key).join(name);
                let copied = ledger.was_copied(&destination);
                report.trace.push(TraceRow::Attachment {
                    name: name.clone(),
                    copied,
                });
                report
                    .files
                    .push(if copied { FileMark::Copied } else { FileMark::Existing });
            }

            report.records.push(if result.was_written() {
                RecordMark::Written
            } else {
                RecordMark::Unchanged
            });
        }

        tracing::debug!(
            "{}: {}/{} done, {} skipped",
            manifest_path.display(),
            summary.done,
            summary.total,
            summary.skipped
        );
        report.manifests.push(summary);

        Ok(())
    }

    /// Directory for records of `key`, rejecting keys that escape the public tree.
    fn record_directory(&self, key: &str) -> Result<PathBuf> {
        let key_path = Path::new(key);
        if key_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(PublishError::InvalidPath {
                path: format!("Feedback key escapes the public directory: {}", key),
            });
        }

        Ok(self.config.public_directory.join(key_path))
    }

    /// Copies the companion tree into the public directory, keeping existing files.
    pub fn copy_companion_tree(&self, files_dir: &Path) -> Result<CopyLedger> {
        let mut ledger = CopyLedger::new();

        for file in companion_files(files_dir) {
            let file = file?;
            let destination = self.config.public_directory.join(&file.relative_path);

            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }

            let copied = if destination.exists() {
                false
            } else {
                self.copy_file(&file.source_path, &destination)?;
                tracing::debug!("copied {}", destination.display());
                true
            };

            ledger.record(destination, copied);
        }

        Ok(ledger)
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<u64> {
        let mut reader = BufReader::with_capacity(self.buffer_size, fs::File::open(source)?);
        let mut writer = BufWriter::with_capacity(self.buffer_size, fs::File::create(dest)?);

        let bytes = std::io::copy(&mut reader, &mut writer)?;
        writer.flush()?;

        // Keep the source modification time like a metadata-preserving copy.
        if let Ok(modified) = fs::metadata(source).and_then(|m| m.modified()) {
            let _ = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(modified));
        }

        Ok(bytes)
    }

    /// Writes the serialized record unless the existing file hashes the same.
    pub fn write_record(&self, record: &FeedbackRecord, path: &Path) -> Result<WriteResult> {
        let content = record.to_yaml()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            let existing = sha256_file(path)?;
            let fresh = hex::encode(Sha256::digest(content.as_bytes()));
            if existing == fresh {
                tracing::debug!("unchanged: {}", path.display());
                return Ok(WriteResult::Unchanged {
                    path: path.to_path_buf(),
                });
            }
        }

        fs::write(path, &content)?;
        tracing::debug!("wrote: {}", path.display());

        Ok(WriteResult::Written {
            path: path.to_path_buf(),
        })
    }
}

/// Immediate subdirectories of `root` with their names, sorted. Plain files are ignored.
pub fn user_directories(root: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut users = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            users.push((entry.path(), name));
        }
    }
    users.sort();

    Ok(users)
}

fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    std::io::copy(&mut fs::File::open(path)?, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
