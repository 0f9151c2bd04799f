pub mod cleanup;
pub mod config;
pub mod download;
pub mod launch;
pub mod remove;
pub mod status;

use clap::Args;
use launchpad::core::version::{VersionEntry, VersionIdentity, VersionKind, UNKNOWN_ID};
use launchpad::core::{LaunchpadError, LaunchpadResult};
use launchpad::di::ConfigProvider;
use std::path::PathBuf;

/// Arguments selecting one version
#[derive(Args, Debug, Clone)]
pub struct VersionArgs {
    /// Version name (e.g. 1.20.0)
    pub name: String,

    /// Distribution channel: release, beta, preview or imported
    #[arg(short, long, default_value = "release", value_parser = parse_kind)]
    pub kind: VersionKind,

    /// Update identity of the build (required for download)
    #[arg(long)]
    pub id: Option<String>,

    /// Revision of the update identity
    #[arg(long, default_value = "1")]
    pub revision: String,

    /// Game directory (defaults to a directory under versions_dir)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

fn parse_kind(value: &str) -> Result<VersionKind, String> {
    value.parse().map_err(|e: LaunchpadError| e.to_string())
}

impl VersionArgs {
    pub fn entry(&self, config: &dyn ConfigProvider) -> LaunchpadResult<VersionEntry> {
        if self.kind == VersionKind::Imported {
            let dir = self.dir.clone().ok_or_else(|| {
                LaunchpadError::Package("Imported versions need --dir".to_string())
            })?;
            return Ok(VersionEntry::imported(self.name.clone(), dir));
        }

        let identity = VersionIdentity::new(
            self.id.clone().unwrap_or_else(|| UNKNOWN_ID.to_string()),
            self.revision.clone(),
            self.kind,
        );
        let mut entry = VersionEntry::new(identity, self.name.clone(), &config.versions_dir()?);
        if let Some(dir) = &self.dir {
            entry.game_directory = dir.clone();
        }
        Ok(entry)
    }
}
