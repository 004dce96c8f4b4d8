pub mod manifest;
pub mod options;
pub mod record;
pub mod report;
pub mod sync;

pub use manifest::{FeedbackEntry, FeedbackManifest};
pub use options::UserOptions;
pub use record::{format_timestamp, FeedbackRecord};
pub use report::{
    CompletionLevel, CopyLedger, EntryMark, FileMark, ManifestSummary, RecordMark, TraceRow,
    UserReport,
};
pub use sync::{user_directories, FeedbackSync, WriteResult};
