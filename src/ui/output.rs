use crate::archive::{format_megabytes, ArchiveReport};
use crate::error::{PublishError, UserFriendlyError};
use crate::feedback::{CompletionLevel, EntryMark, FileMark, RecordMark, TraceRow, UserReport};
use console::{pad_str, style, Alignment, Color, Emoji, Term};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static CHECKMARK: Emoji = Emoji("✓ ", "+ ");
static CROSS: Emoji = Emoji("× ", "x ");
static INFO: Emoji = Emoji("ℹ ", "i ");

const BULLET: &str = "•";
const PLUS: &str = "+";
/// Columns left free at the right edge of status lines.
const LINE_MARGIN: usize = 4;

pub struct OutputFormatter {
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported(),
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            quiet,
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_error(message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn print_user_friendly_error(&self, error: &PublishError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!("{}{}", INFO, style(format!("Suggestion: {}", suggestion)).cyan());
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => eprintln!("SUGGESTION: {}", suggestion),
            }
        }
    }

    // Archives

    /// Permanent line for an archive source that could not be found.
    pub fn missing_file_line(&self, source: &Path) -> String {
        let text = format!("{} does not exist", source.display());
        match self.mode {
            OutputMode::Human => format!("{}{}", self.paint(&CROSS.to_string(), Color::Red), self.fit_line(&text)),
            _ => format!("MISSING: {}", text),
        }
    }

    /// Permanent line for a listed source that is a directory or other non-regular file.
    pub fn not_a_file_line(&self, source: &Path) -> String {
        let text = format!("{} is not a file", source.display());
        match self.mode {
            OutputMode::Human => format!("{}{}", self.paint(&CROSS.to_string(), Color::Yellow), self.fit_line(&text)),
            _ => format!("SKIPPED: {}", text),
        }
    }

    pub fn archive_done_line(&self, report: &ArchiveReport) -> String {
        let text = format!(
            "{} 100% of {}Mb › {}Mb",
            report.display_name(),
            format_megabytes(report.expected_size),
            format_megabytes(report.actual_size)
        );
        match self.mode {
            OutputMode::Human => {
                format!("{}{}", self.paint(&CHECKMARK.to_string(), Color::Green), self.fit_line(&text))
            }
            _ => format!("DONE: {}", text),
        }
    }

    pub fn print_missing_file(&self, source: &Path) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }
        println!("{}", self.missing_file_line(source));
    }

    pub fn print_not_a_file(&self, source: &Path) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }
        println!("{}", self.not_a_file_line(source));
    }

    pub fn print_archive_done(&self, report: &ArchiveReport) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }
        println!("{}", self.archive_done_line(report));
    }

    /// JSON mode only; human and plain modes print per archive as they finish.
    pub fn print_archive_reports(&self, reports: &[ArchiveReport]) {
        if self.mode == OutputMode::Json {
            self.print_json_pretty(&reports);
        }
    }

    // Feedback

    pub fn render_user_report(&self, report: &UserReport, trace: bool) -> Vec<String> {
        let mut progress: Vec<String> = report
            .manifests
            .iter()
            .rev()
            .map(|summary| {
                let color = match summary.level() {
                    CompletionLevel::Low => Color::Red,
                    CompletionLevel::Partial => Color::Yellow,
                    CompletionLevel::Complete => Color::Green,
                };
                format!("{}%", self.paint(&format!("{:.1}", summary.percentage()), color))
            })
            .collect();

        progress.extend(report.entries.iter().map(|mark| match mark {
            EntryMark::Done => self.paint(BULLET, Color::Green),
            EntryMark::Open => self.paint(BULLET, Color::Red),
            EntryMark::Skipped => BULLET.to_string(),
        }));

        let records = if report.records.is_empty() {
            self.paint("no feedbacks", Color::Red)
        } else {
            report
                .records
                .iter()
                .map(|mark| match mark {
                    RecordMark::Written => self.paint(PLUS, Color::Green),
                    RecordMark::Unchanged => self.paint(BULLET, Color::Yellow),
                })
                .collect::<Vec<_>>()
                .join(" ")
        };

        let files = if report.files.is_empty() {
            self.paint("no files", Color::Yellow)
        } else {
            report
                .files
                .iter()
                .map(|mark| match mark {
                    FileMark::Copied => self.paint(PLUS, Color::Green),
                    FileMark::Existing => self.paint(BULLET, Color::Yellow),
                })
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut lines = vec![
            format!("{} {}", report.user, progress.join(" ")),
            format!(" {}", records),
            format!(" {}", files),
        ];

        if trace {
            lines.extend(report.trace.iter().map(|row| self.render_trace_row(row)));
        }

        lines
    }

    pub fn render_trace_row(&self, row: &TraceRow) -> String {
        match row {
            TraceRow::Manifest { name } => format!(" {} {}", self.paint(BULLET, Color::Green), name),
            TraceRow::MissingText { key } => {
                format!("   {} in {}", self.paint(&format!("{} no text", BULLET), Color::Red), key)
            }
            TraceRow::Record { path, written } => {
                let bullet = if *written {
                    self.paint(BULLET, Color::Green)
                } else {
                    BULLET.to_string()
                };
                format!("  {} {}", bullet, path)
            }
            TraceRow::RecordFile { name } => format!("   {} {}", BULLET, name),
            TraceRow::Attachment { name, copied } => {
                if *copied {
                    format!("   {} {}", self.paint(PLUS, Color::Green), name)
                } else {
                    format!("   {} {}", BULLET, name)
                }
            }
        }
    }

    pub fn print_user_report(&self, report: &UserReport, trace: bool) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }
        for line in self.render_user_report(report, trace) {
            println!("{}", line);
        }
    }

    pub fn print_user_reports(&self, reports: &[UserReport]) {
        if self.mode == OutputMode::Json {
            self.print_json_pretty(&reports);
        }
    }

    // Private helper methods

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            style(text).fg(color).force_styling(true).to_string()
        } else {
            text.to_string()
        }
    }

    /// Pads or truncates (with `..`) to the terminal width minus the margin.
    fn fit_line(&self, text: &str) -> String {
        let (_, columns) = self.term.size();
        let width = (columns as usize).saturating_sub(LINE_MARGIN);
        fit_to_width(text, width)
    }

    fn print_human_error(&self, message: &str) {
        if self.use_colors {
            eprintln!("{}{}", CROSS, style(message).red().bold());
        } else {
            eprintln!("x {}", message);
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_json_pretty<T: Serialize>(&self, value: &T) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
        );
    }
}

fn fit_to_width(text: &str, width: usize) -> String {
    pad_str(text, width, Alignment::Left, Some("..")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::ManifestSummary;
    use std::path::PathBuf;

    fn plain() -> OutputFormatter {
        OutputFormatter::new(OutputMode::Plain, false)
    }

    fn sample_report() -> UserReport {
        let mut report = UserReport::new("anna");
        report.manifests = vec![
            ManifestSummary {
                path: PathBuf::from("a.yaml"),
                done: 1,
                total: 4,
                skipped: 0,
            },
            ManifestSummary {
                path: PathBuf::from("b.yaml"),
                done: 2,
                total: 2,
                skipped: 1,
            },
        ];
        report.entries = vec![EntryMark::Done, EntryMark::Open, EntryMark::Skipped];
        report.records = vec![RecordMark::Written, RecordMark::Unchanged];
        report.trace = vec![
            TraceRow::Manifest {
                name: "a.yaml".to_string(),
            },
            TraceRow::MissingText {
                key: "home".to_string(),
            },
        ];
        report
    }

    #[test]
    fn test_colors_only_in_human_mode() {
        assert!(!OutputFormatter::new(OutputMode::Plain, false).use_colors);
        assert!(!OutputFormatter::new(OutputMode::Json, false).use_colors);
        assert!(OutputFormatter::new(OutputMode::Human, true).quiet);
    }

    #[test]
    fn test_render_user_report_lines() {
        let lines = plain().render_user_report(&sample_report(), false);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "anna 100.0% 25.0% • • •");
        assert_eq!(lines[1], " + •");
        assert_eq!(lines[2], " no files");
    }

    #[test]
    fn test_render_empty_report() {
        let lines = plain().render_user_report(&UserReport::new("bob"), false);
        assert_eq!(lines[0], "bob ");
        assert_eq!(lines[1], " no feedbacks");
        assert_eq!(lines[2], " no files");
    }

    #[test]
    fn test_render_trace_rows() {
        let formatter = plain();
        let lines = formatter.render_user_report(&sample_report(), true);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], " • a.yaml");
        assert_eq!(lines[4], "   • no text in home");

        assert_eq!(
            formatter.render_trace_row(&TraceRow::Record {
                path: "home/2024-03-09-anna.yaml".to_string(),
                written: true
            }),
            "  • home/2024-03-09-anna.yaml"
        );
        assert_eq!(
            formatter.render_trace_row(&TraceRow::Attachment {
                name: "logo.png".to_string(),
                copied: true
            }),
            "   + logo.png"
        );
    }

    #[test]
    fn test_archive_lines() {
        let formatter = plain();
        let report = ArchiveReport {
            zip_path: PathBuf::from("out/site.zip"),
            files_added: 2,
            missing: vec![],
            not_files: vec![],
            expected_size: 3 * 1024 * 1024,
            actual_size: 1024 * 1024 + 512 * 1024,
        };

        assert_eq!(
            formatter.archive_done_line(&report),
            "DONE: site.zip 100% of 3.0Mb › 1.5Mb"
        );
        assert_eq!(
            formatter.missing_file_line(Path::new("dist/gone.js")),
            "MISSING: dist/gone.js does not exist"
        );
        assert_eq!(
            formatter.not_a_file_line(Path::new("dist/assets")),
            "SKIPPED: dist/assets is not a file"
        );
    }

    #[test]
    fn test_fit_to_width() {
        assert_eq!(fit_to_width("abc", 6), "abc   ");
        assert_eq!(fit_to_width("abcdefghij", 6), "abcd..");
        assert_eq!(fit_to_width("abcdef", 6), "abcdef");
    }
}
