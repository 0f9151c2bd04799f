use crate::core::error::{LaunchpadError, LaunchpadResult};
use std::path::{Path, PathBuf};

/// Get the Launchpad home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\launchpad
/// - Linux: ~/.config/launchpad
/// - macOS: ~/Library/Application Support/launchpad
pub fn launchpad_home() -> LaunchpadResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| LaunchpadError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("launchpad"))
}

/// Get the config file path (`<home>/config.yaml`)
pub fn config_file() -> LaunchpadResult<PathBuf> {
    Ok(launchpad_home()?.join("config.yaml"))
}

/// Get the data directory holding downloaded archives and installed versions
///
/// Platform-specific locations:
/// - Windows: %LOCALAPPDATA%\launchpad
/// - Linux: ~/.local/share/launchpad
/// - macOS: ~/Library/Application Support/launchpad
pub fn data_dir() -> LaunchpadResult<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| LaunchpadError::Path("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("launchpad"))
}

/// Default directory for extracted versions
pub fn versions_dir() -> LaunchpadResult<PathBuf> {
    Ok(data_dir()?.join("versions"))
}

/// Default directory for downloaded archives
pub fn downloads_dir() -> LaunchpadResult<PathBuf> {
    Ok(data_dir()?.join("downloads"))
}

/// Default staging path for game data moved out of the way during reinstall.
///
/// Lives directly under the local application data root, shared with other
/// launchers that use the same slot.
pub fn backup_staging_dir() -> LaunchpadResult<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| LaunchpadError::Path("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("TmpMinecraftLocalState"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> LaunchpadResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Make a path absolute without touching the filesystem.
///
/// Package install locations are compared against this form.
pub fn absolute(path: &Path) -> LaunchpadResult<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        LaunchpadError::Path(format!("Failed to resolve {}: {}", path.display(), e))
    })
}
