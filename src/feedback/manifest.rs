use crate::error::{PublishError, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// One feedback manifest: entries keyed by page URI, in document order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedbackManifest {
    #[serde(default, deserialize_with = "ordered_entries")]
    pub feedback: Vec<(String, FeedbackEntry)>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeedbackEntry {
    /// Submission time in milliseconds since the Unix epoch.
    pub date: i64,
    pub text: String,
    #[serde(default)]
    pub done: Option<bool>,
}

impl FeedbackManifest {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| PublishError::manifest(path, e))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let manifest: Option<Self> = serde_yaml::from_str(content)?;
        Ok(manifest.unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.feedback.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feedback.is_empty()
    }
}

impl FeedbackEntry {
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

fn ordered_entries<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, FeedbackEntry)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, FeedbackEntry)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping of feedback keys to entries")
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, entry)) = map.next_entry::<String, FeedbackEntry>()? {
                entries.push((key, entry));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_any(EntriesVisitor)
}
