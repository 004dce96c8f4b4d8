use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest {path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize feedback record: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("Archive operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Invalid timestamp {value} for feedback {key}")]
    InvalidTimestamp { key: String, value: i64 },
}

impl PublishError {
    pub fn manifest<P: AsRef<Path>>(path: P, source: serde_yaml::Error) -> Self {
        PublishError::Manifest {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Process exit code for a run aborted by this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PublishError::Config { .. } => 2,
            PublishError::Manifest { .. } | PublishError::InvalidTimestamp { .. } => 3,
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for PublishError {
    fn user_message(&self) -> String {
        match self {
            PublishError::Io(e) => match e.kind() {
                std::io::ErrorKind::PermissionDenied => format!("Permission denied: {}", e),
                std::io::ErrorKind::NotFound => format!("File or directory not found: {}", e),
                _ => format!("IO error: {}", e),
            },
            PublishError::Manifest { path, source } => {
                format!("Manifest {} could not be parsed: {}", path, source)
            }
            PublishError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            PublishError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            PublishError::InvalidTimestamp { key, value } => {
                format!("Feedback '{}' has an out-of-range date: {}", key, value)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            PublishError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Some(
                "Ensure you have the necessary read/write permissions for the source and output directories.".to_string()
            ),
            PublishError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => Some(
                "Check that the manifest and source directories exist, or point to them with --manifest/--source.".to_string()
            ),
            PublishError::Manifest { .. } => Some(
                "Check the YAML syntax and that all required keys are present.".to_string()
            ),
            PublishError::Config { .. } => Some(
                "Check your configuration file syntax or regenerate one with --generate-config.".to_string()
            ),
            PublishError::InvalidTimestamp { .. } => Some(
                "Feedback dates are expected as milliseconds since the Unix epoch.".to_string()
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PublishError>;
