use crate::core::path::{config_file, ensure_dir};
use crate::core::{LaunchpadError, LaunchpadResult};
use crate::di::ConfigProvider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "LAUNCHPAD_CONFIG";

/// What to do when restored game data collides with data already present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Ask for every conflicting file
    #[default]
    Ask,
    /// Always overwrite with the backed up copy
    Replace,
    /// Always keep what is already there
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Update service endpoint resolving identities to download locations
    #[serde(default = "default_update_endpoint")]
    pub update_endpoint: String,

    /// Only download URLs starting with this prefix are accepted
    #[serde(default = "default_trusted_download_prefix")]
    pub trusted_download_prefix: String,

    /// Directory holding extracted versions
    ///
    /// Default locations:
    /// - Windows: %LOCALAPPDATA%\launchpad\versions
    /// - Linux: ~/.local/share/launchpad/versions
    /// - macOS: ~/Library/Application Support/launchpad/versions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions_dir: Option<String>,

    /// Directory holding downloaded archives (defaults next to versions_dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,

    /// Whether to delete the archive once it has been extracted
    #[serde(default = "default_true")]
    pub delete_archive_after_download: bool,

    /// Staging directory for game data during reinstall
    /// (defaults to %LOCALAPPDATA%\TmpMinecraftLocalState)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_staging_dir: Option<String>,

    /// Conflict handling when restoring backed up game data
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    /// Path to the identity broker helper executable
    /// (looked up on PATH as `wu-token-helper` when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_helper: Option<String>,
}

fn default_update_endpoint() -> String {
    "https://fe3.delivery.mp.microsoft.com/ClientWebService/client.asmx/secured".to_string()
}

fn default_trusted_download_prefix() -> String {
    "http://tlu.dl.delivery.mp.microsoft.com/".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_endpoint: default_update_endpoint(),
            trusted_download_prefix: default_trusted_download_prefix(),
            versions_dir: None,
            download_dir: None,
            delete_archive_after_download: true,
            backup_staging_dir: None,
            conflict_policy: ConflictPolicy::default(),
            token_helper: None,
        }
    }
}

impl Config {
    /// Location of the config file, honoring `LAUNCHPAD_CONFIG`
    pub fn path() -> LaunchpadResult<PathBuf> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Ok(PathBuf::from(path)),
            None => config_file(),
        }
    }

    /// Load config from the platform config directory, creating default if it doesn't exist
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\launchpad\config.yaml
    /// - Linux: ~/.config/launchpad/config.yaml
    /// - macOS: ~/Library/Application Support/launchpad/config.yaml
    pub fn load() -> LaunchpadResult<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(config_path: &Path) -> LaunchpadResult<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(config_path)?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| LaunchpadError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> LaunchpadResult<()> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| LaunchpadError::Path("Invalid config path".to_string()))?;

        ensure_dir(config_dir)?;

        let content = serde_yaml::to_string(self)
            .map_err(|e| LaunchpadError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn get_versions_dir(&self) -> LaunchpadResult<PathBuf> {
        match self.versions_dir {
            Some(ref dir) => Ok(PathBuf::from(dir)),
            None => crate::core::path::versions_dir(),
        }
    }

    pub fn get_download_dir(&self) -> LaunchpadResult<PathBuf> {
        match self.download_dir {
            Some(ref dir) => Ok(PathBuf::from(dir)),
            None => crate::core::path::downloads_dir(),
        }
    }

    pub fn get_backup_staging_dir(&self) -> LaunchpadResult<PathBuf> {
        match self.backup_staging_dir {
            Some(ref dir) => Ok(PathBuf::from(dir)),
            None => crate::core::path::backup_staging_dir(),
        }
    }
}

impl ConfigProvider for Config {
    fn update_endpoint(&self) -> &str {
        &self.update_endpoint
    }

    fn trusted_download_prefix(&self) -> &str {
        &self.trusted_download_prefix
    }

    fn versions_dir(&self) -> LaunchpadResult<PathBuf> {
        self.get_versions_dir()
    }

    fn download_dir(&self) -> LaunchpadResult<PathBuf> {
        self.get_download_dir()
    }

    fn delete_archive_after_download(&self) -> bool {
        self.delete_archive_after_download
    }

    fn backup_staging_dir(&self) -> LaunchpadResult<PathBuf> {
        self.get_backup_staging_dir()
    }

    fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }

    fn token_helper(&self) -> Option<&str> {
        self.token_helper.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.update_endpoint.starts_with("https://fe3.delivery.mp.microsoft.com/"));
        assert_eq!(
            config.trusted_download_prefix,
            "http://tlu.dl.delivery.mp.microsoft.com/"
        );
        assert!(config.delete_archive_after_download);
        assert_eq!(config.conflict_policy, ConflictPolicy::Ask);
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.yaml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.update_endpoint, default_update_endpoint());
    }

    #[test]
    fn test_save_and_load_roundtrip_custom_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");

        let config = Config {
            versions_dir: Some("/games/versions".to_string()),
            delete_archive_after_download: false,
            conflict_policy: ConflictPolicy::Skip,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.versions_dir.as_deref(), Some("/games/versions"));
        assert!(!loaded.delete_archive_after_download);
        assert_eq!(loaded.conflict_policy, ConflictPolicy::Skip);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "conflict_policy: replace\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.conflict_policy, ConflictPolicy::Replace);
        assert!(loaded.delete_archive_after_download);
        assert_eq!(loaded.trusted_download_prefix, default_trusted_download_prefix());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "conflict_policy: [unterminated").unwrap();

        match Config::load_from(&path) {
            Err(LaunchpadError::Config(msg)) => assert!(msg.contains("Failed to parse config")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_dirs() {
        let config = Config {
            versions_dir: Some("/v".to_string()),
            download_dir: Some("/d".to_string()),
            backup_staging_dir: Some("/s".to_string()),
            ..Default::default()
        };
        assert_eq!(config.get_versions_dir().unwrap(), PathBuf::from("/v"));
        assert_eq!(config.get_download_dir().unwrap(), PathBuf::from("/d"));
        assert_eq!(config.get_backup_staging_dir().unwrap(), PathBuf::from("/s"));
    }

    #[test]
    #[serial_test::serial]
    fn test_path_honors_env_override() {
        std::env::set_var(CONFIG_ENV, "/tmp/launchpad-test/config.yaml");
        let path = Config::path().unwrap();
        std::env::remove_var(CONFIG_ENV);
        assert_eq!(path, PathBuf::from("/tmp/launchpad-test/config.yaml"));
    }
}
