use crate::error::{PublishError, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// A file found under a manifest's companion `files` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionFile {
    pub source_path: PathBuf,
    /// Path relative to the companion directory.
    pub relative_path: PathBuf,
    pub filename: String,
    pub extension: String,
}

impl CompanionFile {
    pub fn new(source_path: PathBuf, relative_path: PathBuf) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self {
            source_path,
            relative_path,
            filename,
            extension,
        }
    }

    /// Directory holding the file, relative to the companion directory.
    pub fn relative_dir(&self) -> &Path {
        self.relative_path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Lazily walks every regular file below `files_dir`, sorted by name.
///
/// A missing directory yields nothing.
pub fn companion_files(files_dir: &Path) -> Box<dyn Iterator<Item = Result<CompanionFile>> + '_> {
    if !files_dir.is_dir() {
        return Box::new(std::iter::empty());
    }

    let walker = WalkDir::new(files_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    Box::new(walker.filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => return Some(Err(PublishError::Io(err.into()))),
        };

        if !entry.file_type().is_file() {
            return None;
        }

        Some(relative_to(entry.path(), files_dir).map(|relative| {
            CompanionFile::new(entry.path().to_path_buf(), relative)
        }))
    }))
}

fn relative_to(path: &Path, root: &Path) -> Result<PathBuf> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| PublishError::InvalidPath {
            path: format!(
                "Cannot calculate relative path for {} from root {}",
                path.display(),
                root.display()
            ),
        })?;

    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(PublishError::InvalidPath {
            path: format!(
                "Path contains parent directory references: {}",
                relative.display()
            ),
        });
    }

    Ok(relative.to_path_buf())
}
