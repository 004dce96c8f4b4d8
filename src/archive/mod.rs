pub mod manifest;
pub mod writer;

pub use manifest::{ArchiveEntry, ArchiveManifest};
pub use writer::{format_megabytes, ArchiveEvent, ArchiveReport, Archiver};
