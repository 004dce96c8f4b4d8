use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nwpub-archive")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Package a distribution directory into zip archives")]
#[command(
    long_about = "Reads an archive manifest and writes every listed archive, adding each \
                  declared file from the base directory under its relative path. Missing \
                  files are reported and skipped."
)]
#[command(after_help = "EXAMPLES:\n  \
    nwpub-archive\n  \
    nwpub-archive --manifest build/archives.yaml --base-dir build/dist\n  \
    nwpub-archive --output-format json > archives.json")]
pub struct ArchiveCli {
    /// Archive manifest (defaults to .nw/publish.archive.meta.yaml)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Directory the manifest's file paths are relative to (defaults to ./dist)
    #[arg(short, long = "base-dir")]
    pub base_dir: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(name = "nwpub-feedbacks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Publish per-user feedback records and attachments")]
#[command(
    long_about = "Walks one directory per user, turns every feedback manifest entry into a \
                  record file under the public directory and copies companion attachments. \
                  Records whose content is unchanged are left untouched."
)]
#[command(after_help = "EXAMPLES:\n  \
    nwpub-feedbacks\n  \
    nwpub-feedbacks --trace\n  \
    nwpub-feedbacks --source review/feedbacks --public-dir site/public/dev")]
pub struct FeedbacksCli {
    /// Print every manifest, record and attachment after the summary lines
    #[arg(long)]
    pub trace: bool,

    /// Root holding one directory per user (defaults to ./feedbacks)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Destination tree for records and attachments (defaults to ./public/dev)
    #[arg(short, long = "public-dir")]
    pub public_dir: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Flags shared by both binaries.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl CommonArgs {
    pub fn output_mode(&self) -> OutputMode {
        self.output_format.into()
    }

    /// Target file for `--generate-config`.
    pub fn generated_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from("nwpub.toml"))
    }

    fn load_config(&self, overrides: &CliOverrides) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;
        config.merge_with_cli_args(overrides);
        config.validate()?;

        Ok(config)
    }
}

impl ArchiveCli {
    pub fn load_config(&self) -> Result<Config> {
        self.common.load_config(&self.create_cli_overrides())
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_manifest(self.manifest.clone())
            .with_base_directory(self.base_dir.clone())
    }
}

impl FeedbacksCli {
    pub fn load_config(&self) -> Result<Config> {
        self.common.load_config(&self.create_cli_overrides())
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_source_directory(self.source.clone())
            .with_public_directory(self.public_dir.clone())
    }
}
