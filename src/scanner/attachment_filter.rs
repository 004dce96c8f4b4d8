use crate::config::FeedbackConfig;
use crate::error::Result;
use crate::scanner::companion_scanner::{companion_files, CompanionFile};
use std::path::Path;

/// Decides which companion files count as attachments of a feedback entry.
pub struct AttachmentFilter {
    excluded_extensions: Vec<String>,
}

impl AttachmentFilter {
    pub fn new(config: &FeedbackConfig) -> Self {
        Self {
            excluded_extensions: config
                .excluded_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
        }
    }

    pub fn is_attachment(&self, file: &CompanionFile) -> bool {
        !self.excluded_extensions.contains(&file.extension)
    }

    /// Files whose containing directory, relative to `files_dir`, is exactly `key`.
    pub fn belongs_to(&self, file: &CompanionFile, key: &str) -> bool {
        self.is_attachment(file) && file.relative_dir() == Path::new(key)
    }

    /// Attachment names for `key`, in walk order.
    pub fn attachments_for(&self, files_dir: &Path, key: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for file in companion_files(files_dir) {
            let file = file?;
            if self.belongs_to(&file, key) {
                names.push(file.filename);
            }
        }

        Ok(names)
    }
}

impl Default for AttachmentFilter {
    fn default() -> Self {
        Self::new(&FeedbackConfig::default())
    }
}
