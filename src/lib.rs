pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{ArchiveCli, CommonArgs, FeedbacksCli, OutputFormat};
pub use config::{ArchiveConfig, CliOverrides, Config, FeedbackConfig};
pub use error::{PublishError, Result, UserFriendlyError};

// Core functionality re-exports
pub use archive::{ArchiveEntry, ArchiveEvent, ArchiveManifest, ArchiveReport, Archiver};
pub use feedback::{FeedbackSync, UserReport};
pub use scanner::{AttachmentFilter, ManifestScanner};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shared driver for both binaries: configuration plus console output.
pub struct Publisher {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl Publisher {
    pub fn new(config: Config, output_mode: OutputMode, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    pub fn from_archive_cli(cli_args: &ArchiveCli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::from_common(config, &cli_args.common))
    }

    pub fn from_feedbacks_cli(cli_args: &FeedbacksCli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::from_common(config, &cli_args.common))
    }

    fn from_common(config: Config, common: &CommonArgs) -> Self {
        Self::new(config, common.output_mode(), common.quiet)
    }

    /// Writes every archive of the configured manifest, reporting as it goes.
    pub fn build_archives(&self) -> Result<Vec<ArchiveReport>> {
        let manifest = ArchiveManifest::load(&self.config.archive.manifest)?;
        let archiver = Archiver::new(self.config.archive.base_directory.clone());

        tracing::info!(
            "{} archives, {} files from {}",
            manifest.archives.len(),
            manifest.total_files(),
            archiver.base_directory().display()
        );

        let mut reports = Vec::with_capacity(manifest.archives.len());

        for entry in &manifest.archives {
            let pb = self
                .progress_manager
                .create_archive_progress(&entry.display_name(), entry.files.len() as u64);

            let progress_callback = |event: &ArchiveEvent| {
                match event {
                    ArchiveEvent::Missing { source, .. } => self
                        .progress_manager
                        .suspend(|| self.output_formatter.print_missing_file(source)),
                    ArchiveEvent::NotAFile { source, .. } => self
                        .progress_manager
                        .suspend(|| self.output_formatter.print_not_a_file(source)),
                    ArchiveEvent::Added { .. } => {}
                }
                ui::progress::update_archive_progress(&pb, event);
            };

            let report = archiver.create_archive(entry, Some(&progress_callback));
            pb.finish_and_clear();

            let report = report?;
            self.output_formatter.print_archive_done(&report);
            reports.push(report);
        }

        self.output_formatter.print_archive_reports(&reports);

        Ok(reports)
    }

    /// Synchronizes every user below the configured source directory.
    pub fn sync_feedbacks(&self, trace: bool) -> Result<Vec<UserReport>> {
        let sync = FeedbackSync::new(&self.config.feedback);
        let users = feedback::user_directories(&self.config.feedback.source_directory)?;

        tracing::info!(
            "{} users in {}, publishing to {}",
            users.len(),
            self.config.feedback.source_directory.display(),
            sync.public_directory().display()
        );

        let mut reports = Vec::with_capacity(users.len());

        for (user_dir, user_name) in &users {
            let spinner = self.progress_manager.create_spinner(user_name);
            let report = sync.sync_user(user_dir, user_name);
            spinner.finish_and_clear();

            let report = report?;
            self.output_formatter.print_user_report(&report, trace);
            reports.push(report);
        }

        self.output_formatter.print_user_reports(&reports);

        Ok(reports)
    }

    /// Writes the default configuration as TOML.
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &PublishError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Installs the stderr `tracing` subscriber. `RUST_LOG` wins over the verbosity flags.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };

    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("nwpub={}", level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(console::Term::stderr().features().colors_supported()),
        )
        .try_init();
}
