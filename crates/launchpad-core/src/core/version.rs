use crate::core::error::{LaunchpadError, LaunchpadResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Identity used by imported versions, which have no update-service identity.
pub const UNKNOWN_ID: &str = "UNKNOWN";

/// Package family of the release and beta builds.
pub const RELEASE_PACKAGE_FAMILY: &str = "Microsoft.MinecraftUWP_8wekyb3d8bbwe";

/// Package family of the preview builds.
pub const PREVIEW_PACKAGE_FAMILY: &str = "Microsoft.MinecraftWindowsBeta_8wekyb3d8bbwe";

/// Distribution channel of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    Release,
    /// Requires an authenticated download.
    Beta,
    Preview,
    /// Supplied by the user as an archive; never downloaded.
    Imported,
}

impl VersionKind {
    pub fn requires_authentication(self) -> bool {
        self == VersionKind::Beta
    }

    pub fn package_family(self) -> &'static str {
        match self {
            VersionKind::Preview => PREVIEW_PACKAGE_FAMILY,
            _ => RELEASE_PACKAGE_FAMILY,
        }
    }

    /// Prefix shared by the archive file name and the install directory.
    fn file_prefix(self) -> &'static str {
        match self {
            VersionKind::Preview => "Minecraft-Preview-",
            _ => "Minecraft-",
        }
    }
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersionKind::Release => "release",
            VersionKind::Beta => "beta",
            VersionKind::Preview => "preview",
            VersionKind::Imported => "imported",
        };
        f.write_str(s)
    }
}

impl FromStr for VersionKind {
    type Err = LaunchpadError;

    fn from_str(s: &str) -> LaunchpadResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "release" => Ok(VersionKind::Release),
            "beta" => Ok(VersionKind::Beta),
            "preview" => Ok(VersionKind::Preview),
            "imported" => Ok(VersionKind::Imported),
            other => Err(LaunchpadError::Package(format!(
                "Unknown version kind '{}' (expected release, beta, preview or imported)",
                other
            ))),
        }
    }
}

/// The (id, revision, kind) tuple identifying a distributable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionIdentity {
    pub id: String,
    pub revision: String,
    pub kind: VersionKind,
}

impl VersionIdentity {
    pub fn new(id: impl Into<String>, revision: impl Into<String>, kind: VersionKind) -> Self {
        Self {
            id: id.into(),
            revision: revision.into(),
            kind,
        }
    }

    pub fn imported() -> Self {
        Self::new(UNKNOWN_ID, "0", VersionKind::Imported)
    }

    pub fn has_network_identity(&self) -> bool {
        self.kind != VersionKind::Imported && self.id != UNKNOWN_ID
    }
}

/// A catalog version together with where it lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub identity: VersionIdentity,
    pub name: String,
    pub game_directory: PathBuf,
}

impl VersionEntry {
    /// Entry installed under `versions_dir` with the conventional directory name.
    pub fn new(identity: VersionIdentity, name: impl Into<String>, versions_dir: &Path) -> Self {
        let name = name.into();
        let game_directory = versions_dir.join(format!("{}{}", identity.kind.file_prefix(), name));
        Self {
            identity,
            name,
            game_directory,
        }
    }

    /// Recover an entry from an install directory name under `versions_dir`
    ///
    /// Only the package family can be told from the name, so the identity
    /// is unknown and beta installs come back as release entries.
    pub fn from_install_dir(dir_name: &str, versions_dir: &Path) -> Option<Self> {
        let (kind, name) = match dir_name.strip_prefix(VersionKind::Preview.file_prefix()) {
            Some(name) => (VersionKind::Preview, name),
            None => (
                VersionKind::Release,
                dir_name.strip_prefix(VersionKind::Release.file_prefix())?,
            ),
        };
        if name.is_empty() {
            return None;
        }
        Some(Self::new(
            VersionIdentity::new(UNKNOWN_ID, "0", kind),
            name,
            versions_dir,
        ))
    }

    pub fn imported(name: impl Into<String>, directory: PathBuf) -> Self {
        Self {
            identity: VersionIdentity::imported(),
            name: name.into(),
            game_directory: directory,
        }
    }

    pub fn kind(&self) -> VersionKind {
        self.identity.kind
    }

    pub fn package_family(&self) -> &'static str {
        self.identity.kind.package_family()
    }

    /// Deterministic archive name derived from kind and name.
    pub fn archive_file_name(&self) -> String {
        format!("{}{}.Appx", self.identity.kind.file_prefix(), self.name)
    }

    pub fn is_installed(&self) -> bool {
        self.game_directory.is_dir()
    }

    pub fn display_name(&self) -> String {
        match self.identity.kind {
            VersionKind::Beta => format!("{} (beta)", self.name),
            VersionKind::Preview => format!("{} (preview)", self.name),
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Beta".parse::<VersionKind>().unwrap(), VersionKind::Beta);
        assert_eq!("preview".parse::<VersionKind>().unwrap(), VersionKind::Preview);
        assert!("nightly".parse::<VersionKind>().is_err());
    }

    #[test]
    fn test_package_family_by_kind() {
        assert_eq!(VersionKind::Release.package_family(), RELEASE_PACKAGE_FAMILY);
        assert_eq!(VersionKind::Beta.package_family(), RELEASE_PACKAGE_FAMILY);
        assert_eq!(VersionKind::Preview.package_family(), PREVIEW_PACKAGE_FAMILY);
    }

    #[test]
    fn test_entry_naming() {
        let versions = Path::new("/games");
        let release = VersionEntry::new(
            VersionIdentity::new("abc", "1", VersionKind::Release),
            "1.20.1",
            versions,
        );
        assert_eq!(release.archive_file_name(), "Minecraft-1.20.1.Appx");
        assert_eq!(release.game_directory, versions.join("Minecraft-1.20.1"));

        let preview = VersionEntry::new(
            VersionIdentity::new("def", "1", VersionKind::Preview),
            "1.21.0.20",
            versions,
        );
        assert_eq!(preview.archive_file_name(), "Minecraft-Preview-1.21.0.20.Appx");
        assert_eq!(
            preview.game_directory,
            versions.join("Minecraft-Preview-1.21.0.20")
        );
    }

    #[test]
    fn test_entry_from_install_dir() {
        let versions = Path::new("/games");

        let preview = VersionEntry::from_install_dir("Minecraft-Preview-1.21.0.20", versions).unwrap();
        assert_eq!(preview.kind(), VersionKind::Preview);
        assert_eq!(preview.name, "1.21.0.20");
        assert_eq!(preview.game_directory, versions.join("Minecraft-Preview-1.21.0.20"));

        let release = VersionEntry::from_install_dir("Minecraft-1.20.1", versions).unwrap();
        assert_eq!(release.kind(), VersionKind::Release);
        assert_eq!(release.package_family(), RELEASE_PACKAGE_FAMILY);
        assert!(!release.identity.has_network_identity());

        assert!(VersionEntry::from_install_dir("Minecraft-", versions).is_none());
        assert!(VersionEntry::from_install_dir("notes", versions).is_none());
    }

    #[test]
    fn test_imported_has_no_network_identity() {
        let entry = VersionEntry::imported("custom.appx", PathBuf::from("imported/custom.appx"));
        assert_eq!(entry.identity.id, UNKNOWN_ID);
        assert!(!entry.identity.has_network_identity());
        assert!(VersionIdentity::new("abc", "1", VersionKind::Beta).has_network_identity());
    }

    #[test]
    fn test_display_name() {
        let beta = VersionEntry::new(
            VersionIdentity::new("abc", "1", VersionKind::Beta),
            "1.2",
            Path::new("."),
        );
        assert_eq!(beta.display_name(), "1.2 (beta)");
    }
}
