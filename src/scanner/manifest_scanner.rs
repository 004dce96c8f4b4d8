use crate::config::FeedbackConfig;
use crate::error::{PublishError, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Finds feedback manifests below a user directory.
pub struct ManifestScanner {
    options_file: String,
    files_directory: String,
    manifest_extension: String,
}

impl ManifestScanner {
    pub fn new(config: &FeedbackConfig) -> Self {
        Self {
            options_file: config.options_file.clone(),
            files_directory: config.files_directory.clone(),
            manifest_extension: config.manifest_extension.to_lowercase(),
        }
    }

    /// Lazily yields manifest paths in name order, depth first.
    ///
    /// Options files are skipped at every depth and companion attachment
    /// directories are never entered.
    pub fn manifests<'a>(&'a self, user_dir: &Path) -> impl Iterator<Item = Result<PathBuf>> + 'a {
        WalkDir::new(user_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| self.should_visit(e))
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.is_manifest(entry.path()) {
                        Some(Ok(entry.into_path()))
                    } else {
                        None
                    }
                }
                Err(err) => Some(Err(PublishError::Io(err.into()))),
            })
    }

    fn should_visit(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        let name = entry.file_name().to_string_lossy();
        if name == self.options_file.as_str() {
            return false;
        }

        !(entry.file_type().is_dir() && name == self.files_directory.as_str())
    }

    pub fn is_manifest(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.to_lowercase() == self.manifest_extension)
    }
}

impl Default for ManifestScanner {
    fn default() -> Self {
        Self::new(&FeedbackConfig::default())
    }
}
