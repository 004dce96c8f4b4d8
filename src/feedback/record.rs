use crate::error::{PublishError, Result};
use crate::feedback::manifest::FeedbackEntry;
use crate::feedback::options::UserOptions;
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Display format for submission times; the file name uses its first 10 characters.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const DATE_PREFIX_LEN: usize = 10;

/// Published form of one feedback entry.
///
/// Fields are declared in key order so serialized records are stable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedbackRecord {
    pub date: String,
    pub done: Option<bool>,
    pub files: Vec<String>,
    pub from: String,
    pub message: String,
    pub time: i64,
    pub to: String,
}

impl FeedbackRecord {
    pub fn build(
        key: &str,
        entry: &FeedbackEntry,
        options: &UserOptions,
        files: Vec<String>,
    ) -> Result<Self> {
        let date = format_timestamp(entry.date).ok_or_else(|| PublishError::InvalidTimestamp {
            key: key.to_string(),
            value: entry.date,
        })?;

        Ok(Self {
            date,
            done: entry.done,
            files,
            from: options.sender().to_string(),
            message: entry.text.clone(),
            time: entry.date,
            to: options.recipient().to_string(),
        })
    }

    /// `<YYYY-MM-DD>-<user>.<extension>`
    pub fn file_name(&self, user_name: &str, extension: &str) -> String {
        let prefix: String = self.date.chars().take(DATE_PREFIX_LEN).collect();
        format!("{}-{}.{}", prefix, user_name, extension)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(PublishError::Serialize)
    }
}

/// Formats epoch milliseconds in local time, `None` when out of range.
pub fn format_timestamp(millis: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: i64, text: &str, done: Option<bool>) -> FeedbackEntry {
        FeedbackEntry {
            date,
            text: text.to_string(),
            done,
        }
    }

    #[test]
    fn test_format_timestamp_shape() {
        let formatted = format_timestamp(1_700_000_000_000).unwrap();
        assert_eq!(formatted.len(), 16);
        assert_eq!(&formatted[4..5], "-");
        assert_eq!(&formatted[10..11], " ");
        assert_eq!(&formatted[13..14], ":");
    }

    #[test]
    fn test_format_timestamp_uses_local_time() {
        let millis = 1_700_000_000_000;
        let expected = Local
            .timestamp_opt(millis / 1000, 0)
            .unwrap()
            .format("%Y-%m-%d %H:%M")
            .to_string();
        assert_eq!(format_timestamp(millis).unwrap(), expected);
    }

    #[test]
    fn test_out_of_range_timestamp() {
        assert!(format_timestamp(i64::MAX).is_none());

        let err = FeedbackRecord::build("home", &entry(i64::MAX, "hi", None), &UserOptions::default(), vec![])
            .unwrap_err();
        assert!(matches!(err, PublishError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_build_record() {
        let options = UserOptions {
            from: Some("Anna".to_string()),
            to: None,
        };
        let record = FeedbackRecord::build(
            "blog/post",
            &entry(1_700_000_000_000, "Fix the header", Some(true)),
            &options,
            vec!["shot.png".to_string()],
        )
        .unwrap();

        assert_eq!(record.from, "Anna");
        assert_eq!(record.to, "");
        assert_eq!(record.time, 1_700_000_000_000);
        assert_eq!(record.done, Some(true));
        assert_eq!(record.message, "Fix the header");
        assert_eq!(record.files, vec!["shot.png"]);
        assert_eq!(record.date, format_timestamp(1_700_000_000_000).unwrap());
    }

    #[test]
    fn test_file_name_uses_date_prefix() {
        let record = FeedbackRecord {
            date: "2024-03-09 17:45".to_string(),
            done: None,
            files: vec![],
            from: String::new(),
            message: "hello".to_string(),
            time: 0,
            to: String::new(),
        };

        assert_eq!(record.file_name("anna", "yaml"), "2024-03-09-anna.yaml");
    }

    #[test]
    fn test_yaml_keys_are_sorted() {
        let record = FeedbackRecord {
            date: "2024-03-09 17:45".to_string(),
            done: None,
            files: vec!["a.png".to_string()],
            from: "Anna".to_string(),
            message: "hello".to_string(),
            time: 1,
            to: "Studio".to_string(),
        };

        let yaml = record.to_yaml().unwrap();
        let keys: Vec<&str> = yaml
            .lines()
            .filter(|l| !l.starts_with(' ') && !l.starts_with('-'))
            .filter_map(|l| l.split(':').next())
            .collect();
        assert_eq!(keys, vec!["date", "done", "files", "from", "message", "time", "to"]);
        assert!(yaml.contains("done: null"));

        let parsed: FeedbackRecord = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, record);
    }
}
