use crate::core::{LaunchpadError, LaunchpadResult};
use crate::di::AppDataStore;
use std::path::PathBuf;

/// Resolves `%LOCALAPPDATA%\Packages\<family>\LocalState`
pub struct LocalAppDataStore {
    packages_root: PathBuf,
}

impl LocalAppDataStore {
    pub fn new() -> LaunchpadResult<Self> {
        let local = dirs::data_local_dir().ok_or_else(|| {
            LaunchpadError::Path("Could not determine local app data directory".to_string())
        })?;
        Ok(Self::with_root(local.join("Packages")))
    }

    pub fn with_root(packages_root: PathBuf) -> Self {
        Self { packages_root }
    }
}

impl AppDataStore for LocalAppDataStore {
    fn local_data_path(&self, family: &str) -> LaunchpadResult<PathBuf> {
        Ok(self.packages_root.join(family).join("LocalState"))
    }
}
