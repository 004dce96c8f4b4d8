use crate::error::{PublishError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Archive build plan produced by the publish step.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveManifest {
    #[serde(default)]
    pub archives: Vec<ArchiveEntry>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    pub zip_path: PathBuf,
    #[serde(default)]
    pub files: Vec<String>,
    /// Expected total size in bytes, only used for reporting.
    #[serde(default)]
    pub size: u64,
}

impl ArchiveManifest {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| PublishError::manifest(path, e))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn total_files(&self) -> usize {
        self.archives.iter().map(|a| a.files.len()).sum()
    }
}

impl ArchiveEntry {
    /// File name of the archive, used as its display label.
    pub fn display_name(&self) -> String {
        self.zip_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.zip_path.display().to_string())
    }
}
