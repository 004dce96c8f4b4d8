use crate::archive::ArchiveEvent;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    /// Single transient line showing the file being added to an archive.
    pub fn create_archive_progress(&self, archive: &str, total_files: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_files));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message(format!("{}  {:.1}%", archive, 0.0));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.multi_progress.suspend(f)
        } else {
            f()
        }
    }
}

/// `<archive>  <pct>% › <file>`
pub fn archive_progress_message(event: &ArchiveEvent) -> String {
    let (archive, file) = match event {
        ArchiveEvent::Added { archive, name, .. } => (archive.as_str(), name.clone()),
        ArchiveEvent::Missing { archive, source, .. }
        | ArchiveEvent::NotAFile { archive, source, .. } => {
            (archive.as_str(), source.display().to_string())
        }
    };

    format!("{}  {:.1}% › {}", archive, event.percentage(), file)
}

pub fn update_archive_progress(pb: &ProgressBar, event: &ArchiveEvent) {
    let (index, _) = event.position();
    pb.set_position(index as u64);
    pb.set_message(archive_progress_message(event));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_disabled_progress_bars() {
        let manager = ProgressManager::new(false);

        assert!(manager.create_archive_progress("site.zip", 3).is_hidden());
        assert!(manager.create_spinner("anna").is_hidden());
        assert_eq!(manager.suspend(|| 7), 7);
    }

    #[test]
    fn test_archive_progress_message() {
        let added = ArchiveEvent::Added {
            archive: "site.zip".to_string(),
            name: "css/main.css".to_string(),
            index: 1,
            total: 4,
        };
        assert_eq!(archive_progress_message(&added), "site.zip  25.0% › css/main.css");

        let missing = ArchiveEvent::Missing {
            archive: "site.zip".to_string(),
            source: PathBuf::from("dist/gone.js"),
            index: 3,
            total: 3,
        };
        assert_eq!(archive_progress_message(&missing), "site.zip  100.0% › dist/gone.js");
    }

    #[test]
    fn test_update_archive_progress() {
        let manager = ProgressManager::new(false);
        let pb = manager.create_archive_progress("site.zip", 2);

        update_archive_progress(
            &pb,
            &ArchiveEvent::Added {
                archive: "site.zip".to_string(),
                name: "index.html".to_string(),
                index: 2,
                total: 2,
            },
        );

        assert_eq!(pb.position(), 2);
        assert_eq!(pb.message(), "site.zip  100.0% › index.html");
    }
}
