use crate::error::{PublishError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub archive: ArchiveConfig,
    pub feedback: FeedbackConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// YAML manifest listing the archives to build.
    pub manifest: PathBuf,
    /// Directory the manifest's relative file paths are resolved against.
    pub base_directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Root holding one subdirectory per user.
    pub source_directory: PathBuf,
    /// Public tree receiving records and attachments.
    pub public_directory: PathBuf,
    /// Per-user options override file name.
    pub options_file: String,
    /// Companion attachment directory next to each manifest.
    pub files_directory: String,
    pub manifest_extension: String,
    pub record_extension: String,
    /// Attachment extensions never listed on a record.
    pub excluded_extensions: Vec<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(".nw").join("publish.archive.meta.yaml"),
            base_directory: std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("dist"),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            source_directory: PathBuf::from("feedbacks"),
            public_directory: PathBuf::from("public").join("dev"),
            options_file: "_.yaml".to_string(),
            files_directory: "files".to_string(),
            manifest_extension: "yaml".to_string(),
            record_extension: "yaml".to_string(),
            excluded_extensions: vec!["json".to_string(), "yaml".to_string()],
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PublishError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| PublishError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| PublishError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["nwpub.toml", ".nwpub.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref manifest) = cli_args.manifest {
            self.archive.manifest = manifest.clone();
        }

        if let Some(ref base_directory) = cli_args.base_directory {
            self.archive.base_directory = base_directory.clone();
        }

        if let Some(ref source) = cli_args.source_directory {
            self.feedback.source_directory = source.clone();
        }

        if let Some(ref public) = cli_args.public_directory {
            self.feedback.public_directory = public.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| PublishError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| PublishError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let feedback = &self.feedback;

        for (name, value) in [
            ("options_file", &feedback.options_file),
            ("files_directory", &feedback.files_directory),
            ("manifest_extension", &feedback.manifest_extension),
            ("record_extension", &feedback.record_extension),
        ] {
            if value.trim().is_empty() {
                return Err(PublishError::Config {
                    message: format!("feedback.{} must not be empty", name),
                });
            }
        }

        if feedback.options_file == feedback.files_directory {
            return Err(PublishError::Config {
                message: "feedback.options_file and feedback.files_directory must differ"
                    .to_string(),
            });
        }

        if feedback
            .excluded_extensions
            .iter()
            .any(|ext| ext.trim().is_empty() || ext.starts_with('.'))
        {
            return Err(PublishError::Config {
                message: "feedback.excluded_extensions entries must be non-empty and given without a leading dot".to_string(),
            });
        }

        if self.archive.manifest.as_os_str().is_empty() {
            return Err(PublishError::Config {
                message: "archive.manifest must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub manifest: Option<PathBuf>,
    pub base_directory: Option<PathBuf>,
    pub source_directory: Option<PathBuf>,
    pub public_directory: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_base_directory(mut self, base_directory: Option<PathBuf>) -> Self {
        self.base_directory = base_directory;
        self
    }

    pub fn with_source_directory(mut self, source: Option<PathBuf>) -> Self {
        self.source_directory = source;
        self
    }

    pub fn with_public_directory(mut self, public: Option<PathBuf>) -> Self {
        self.public_directory = public;
        self
    }
}
