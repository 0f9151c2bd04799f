pub mod backup;
pub mod downloader;
pub mod extractor;
pub mod interactive;
pub mod lifecycle;

pub use backup::BackupSlot;
pub use downloader::{DownloadProgress, DownloadStream, VersionDownloader};
pub use extractor::PackageExtractor;
pub use lifecycle::PackageLifecycleManager;
