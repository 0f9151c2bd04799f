//! Single-slot staging area for game data while a package is reinstalled.
//!
//! Removing a non-development package deletes its application data, so the
//! data directory is moved into the slot first and merged back once the new
//! package is registered. There is exactly one slot: if it is already
//! occupied, a second backup would overwrite unrecovered data and is refused.

use crate::core::{LaunchpadError, LaunchpadResult};
use crate::di::{ConflictAction, ConflictResolver, RestoreConflict};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct BackupSlot {
    staging: PathBuf,
}

impl BackupSlot {
    pub fn new(staging: PathBuf) -> Self {
        Self { staging }
    }

    pub fn path(&self) -> &Path {
        &self.staging
    }

    pub fn is_occupied(&self) -> bool {
        self.staging.exists()
    }

    /// Move `data_dir` into the slot
    ///
    /// Returns `Ok(false)` when there is no data to move. Fails with
    /// `BackupConflict` without touching anything if the slot is occupied.
    pub fn back_up(&self, data_dir: &Path) -> LaunchpadResult<bool> {
        if self.is_occupied() {
            return Err(LaunchpadError::BackupConflict(self.staging.clone()));
        }
        if !data_dir.exists() {
            debug!("No game data at {}, nothing to back up", data_dir.display());
            return Ok(false);
        }

        if let Some(parent) = self.staging.parent() {
            fs::create_dir_all(parent)?;
        }
        info!(
            "Moving game data {} to {}",
            data_dir.display(),
            self.staging.display()
        );
        fs::rename(data_dir, &self.staging)?;
        Ok(true)
    }

    /// Merge the slot's contents into `destination` and empty the slot
    ///
    /// Returns `Ok(false)` when the slot is empty.
    pub fn restore_into(
        &self,
        destination: &Path,
        resolver: &dyn ConflictResolver,
    ) -> LaunchpadResult<bool> {
        if !self.is_occupied() {
            return Ok(false);
        }

        info!(
            "Moving backup game data {} to {}",
            self.staging.display(),
            destination.display()
        );
        fs::create_dir_all(destination)?;
        merge_move(&self.staging, destination, resolver)?;
        fs::remove_dir_all(&self.staging)?;
        Ok(true)
    }
}

/// Recursively move `from` into `to`, consulting `resolver` on collisions.
/// Skipped entries stay behind in `from`.
fn merge_move(from: &Path, to: &Path, resolver: &dyn ConflictResolver) -> LaunchpadResult<()> {
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let source = entry.path();
        let target = to.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            if target.is_dir() {
                merge_move(&source, &target, resolver)?;
                continue;
            }
            if target.exists() {
                let conflict = RestoreConflict::NotADirectory(target.clone());
                if resolver.resolve(&conflict) == ConflictAction::Skip {
                    warn!("Skipping restore of directory {}", target.display());
                    continue;
                }
                fs::remove_file(&target)?;
            }
            fs::rename(&source, &target)?;
        } else {
            if target.exists() {
                let conflict = RestoreConflict::FileExists(target.clone());
                if resolver.resolve(&conflict) == ConflictAction::Skip {
                    debug!("Keeping existing {}", target.display());
                    continue;
                }
                if target.is_dir() {
                    fs::remove_dir_all(&target)?;
                } else {
                    fs::remove_file(&target)?;
                }
            }
            fs::rename(&source, &target)?;
        }
    }
    Ok(())
}
