use crate::core::{LaunchpadError, LaunchpadResult};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

/// Signature file that must not survive a development-mode registration
pub const SIGNATURE_FILE: &str = "AppxSignature.p7x";

/// Extracts downloaded package archives into a version's game directory
pub struct PackageExtractor {
    dest_dir: PathBuf,
}

impl PackageExtractor {
    pub fn new(dest_dir: PathBuf) -> Self {
        Self { dest_dir }
    }

    /// Replace the game directory with the contents of `archive_path`
    ///
    /// Any previous directory is deleted first. A failed extraction leaves
    /// whatever was unpacked so far.
    pub fn extract(&self, archive_path: &Path) -> LaunchpadResult<PathBuf> {
        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| LaunchpadError::Extraction(format!("Invalid package archive: {}", e)))?;

        if self.dest_dir.exists() {
            debug!("Deleting old version at {}", self.dest_dir.display());
            fs::remove_dir_all(&self.dest_dir)?;
        }
        fs::create_dir_all(&self.dest_dir)?;

        info!(
            "Extracting {} ({} entries) to {}",
            archive_path.display(),
            archive.len(),
            self.dest_dir.display()
        );
        archive
            .extract(&self.dest_dir)
            .map_err(|e| LaunchpadError::Extraction(format!("Extract failed: {}", e)))?;

        match fs::remove_file(self.dest_dir.join(SIGNATURE_FILE)) {
            Ok(()) => debug!("Removed {}", SIGNATURE_FILE),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(self.dest_dir.clone())
    }
}
