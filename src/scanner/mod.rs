pub mod attachment_filter;
pub mod companion_scanner;
pub mod manifest_scanner;

pub use attachment_filter::AttachmentFilter;
pub use companion_scanner::{companion_files, CompanionFile};
pub use manifest_scanner::ManifestScanner;
