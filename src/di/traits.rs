//! Trait definitions for dependency injection

use crate::config::ConflictPolicy;
use crate::core::LaunchpadResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Trait for configuration access
///
/// Provides read-only access to application configuration.
/// Implementations should be thread-safe (Send + Sync).
pub trait ConfigProvider: Send + Sync {
    /// Get the update service endpoint
    fn update_endpoint(&self) -> &str;

    /// Get the prefix a download URL must start with to be trusted
    fn trusted_download_prefix(&self) -> &str;

    /// Get the directory holding extracted versions
    fn versions_dir(&self) -> LaunchpadResult<PathBuf>;

    /// Get the directory holding downloaded archives
    fn download_dir(&self) -> LaunchpadResult<PathBuf>;

    /// Check if archives are deleted after extraction
    fn delete_archive_after_download(&self) -> bool;

    /// Get the single staging slot used for game data backups
    fn backup_staging_dir(&self) -> LaunchpadResult<PathBuf>;

    /// Get the restore conflict policy
    fn conflict_policy(&self) -> ConflictPolicy;

    /// Get the configured token helper executable (optional)
    fn token_helper(&self) -> Option<&str>;
}

/// Raw answer of the identity broker: an HRESULT-style status and, on
/// success, the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerResponse {
    pub status: i32,
    pub token: Option<String>,
}

impl BrokerResponse {
    pub fn success(token: impl Into<String>) -> Self {
        Self {
            status: 0,
            token: Some(token.into()),
        }
    }

    pub fn failure(status: i32) -> Self {
        Self {
            status,
            token: None,
        }
    }
}

/// Trait for the OS identity broker
///
/// A single blocking call; callers run it on the blocking pool.
pub trait IdentityBroker: Send + Sync {
    fn request_token(&self) -> BrokerResponse;
}

/// An installed package of some package family, as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub full_name: String,
    /// `None` when the package metadata can no longer be resolved.
    pub install_location: Option<PathBuf>,
    pub is_development_mode: bool,
}

/// Options for registering a package from a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeploymentOptions {
    pub development_mode: bool,
}

/// Options for removing a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemovalOptions {
    /// Ask the OS to keep the package's application data in place
    pub preserve_application_data: bool,
}

/// Trait for the OS package registry
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Enumerate installed packages of a package family
    async fn find_packages(&self, family: &str) -> LaunchpadResult<Vec<PackageRecord>>;

    /// Register a package from its manifest file
    async fn register_package(
        &self,
        manifest: &Path,
        options: DeploymentOptions,
    ) -> LaunchpadResult<()>;

    /// Remove an installed package by full name
    async fn remove_package(&self, full_name: &str, options: RemovalOptions)
        -> LaunchpadResult<()>;
}

/// Trait for the per-package application data store
pub trait AppDataStore: Send + Sync {
    /// Get the local data directory of a package family
    fn local_data_path(&self, family: &str) -> LaunchpadResult<PathBuf>;
}

/// Trait for starting an installed package
#[async_trait]
pub trait ProcessActivator: Send + Sync {
    /// Activate (launch) the application of a package family
    async fn activate(&self, family: &str) -> LaunchpadResult<()>;
}

/// A collision found while merging backed up data into a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreConflict {
    /// A file with the same name already exists at the destination
    FileExists(PathBuf),
    /// A directory must be restored where a regular file stands
    NotADirectory(PathBuf),
}

impl RestoreConflict {
    pub fn path(&self) -> &Path {
        match self {
            RestoreConflict::FileExists(p) | RestoreConflict::NotADirectory(p) => p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// Discard what is at the destination and move the backed up entry in
    Replace,
    /// Keep the destination; the backed up entry is dropped with the staging tree
    Skip,
}

/// Trait deciding restore conflicts
pub trait ConflictResolver: Send + Sync {
    fn resolve(&self, conflict: &RestoreConflict) -> ConflictAction;
}
