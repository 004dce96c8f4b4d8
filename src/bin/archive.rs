use clap::Parser;
use nwpub::{ArchiveCli, OutputFormatter, OutputMode, PublishError, Publisher, UserFriendlyError};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = ArchiveCli::parse();
    nwpub::init_logging(cli.common.verbose, cli.common.quiet);

    if cli.common.generate_config {
        return handle_generate_config(&cli);
    }

    let publisher = match Publisher::from_archive_cli(&cli) {
        Ok(publisher) => publisher,
        Err(e) => {
            print_startup_error(&e, cli.common.output_mode());
            return e.exit_code();
        }
    };

    match publisher.build_archives() {
        Ok(reports) => {
            let incomplete = reports.iter().filter(|r| !r.is_complete()).count();
            if incomplete > 0 {
                tracing::info!("{} of {} archives skipped listed files", incomplete, reports.len());
            }
            0
        }
        Err(e) => {
            publisher.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &ArchiveCli) -> i32 {
    let config_path = cli.common.generated_config_path();

    match Publisher::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path.display());
            println!("\nTo use this configuration:");
            println!("  nwpub-archive --config {}", config_path.display());
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &PublishError, mode: OutputMode) {
    let formatter = OutputFormatter::new(mode, false);
    formatter.print_user_friendly_error(error);
}
