use crate::error::{PublishError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-user identity overrides read from the options file.
///
/// Both fields fall back to an empty string when a record is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserOptions {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl UserOptions {
    /// Loads options, treating a missing or empty file as all defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let options: Option<Self> =
            serde_yaml::from_str(&content).map_err(|e| PublishError::manifest(path, e))?;
        Ok(options.unwrap_or_default())
    }

    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or("")
    }

    pub fn recipient(&self) -> &str {
        self.to.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let options = UserOptions::load(temp_dir.path().join("_.yaml")).unwrap();

        assert_eq!(options, UserOptions::default());
        assert_eq!(options.sender(), "");
        assert_eq!(options.recipient(), "");
    }

    #[test]
    fn test_load_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("_.yaml");
        std::fs::write(&path, "from: Anna\nto: Studio\ntheme: dark\n").unwrap();

        let options = UserOptions::load(&path).unwrap();
        assert_eq!(options.sender(), "Anna");
        assert_eq!(options.recipient(), "Studio");
    }

    #[test]
    fn test_partial_and_empty_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("_.yaml");

        std::fs::write(&path, "to: Studio\n").unwrap();
        let options = UserOptions::load(&path).unwrap();
        assert_eq!(options.sender(), "");
        assert_eq!(options.recipient(), "Studio");

        std::fs::write(&path, "\n").unwrap();
        assert_eq!(UserOptions::load(&path).unwrap(), UserOptions::default());
    }

    #[test]
    fn test_malformed_options_are_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("_.yaml");
        std::fs::write(&path, "from: [unclosed").unwrap();

        assert!(UserOptions::load(&path).is_err());
    }
}
