use crate::core::{LaunchpadError, LaunchpadResult};
use crate::di::{
    AppDataStore, ConflictResolver, DeploymentOptions, PackageRecord, PackageRegistry,
    RemovalOptions,
};
use crate::package::backup::BackupSlot;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Manifest registered from an extracted game directory
pub const MANIFEST_FILE: &str = "AppxManifest.xml";

/// Registers and removes OS packages, keeping game data across reinstalls
pub struct PackageLifecycleManager {
    registry: Arc<dyn PackageRegistry>,
    data_store: Arc<dyn AppDataStore>,
    backup: BackupSlot,
    resolver: Arc<dyn ConflictResolver>,
}

impl PackageLifecycleManager {
    pub fn new(
        registry: Arc<dyn PackageRegistry>,
        data_store: Arc<dyn AppDataStore>,
        backup: BackupSlot,
        resolver: Arc<dyn ConflictResolver>,
    ) -> Self {
        Self {
            registry,
            data_store,
            backup,
            resolver,
        }
    }

    pub fn backup_slot(&self) -> &BackupSlot {
        &self.backup
    }

    /// Make the package in `game_directory` the registered one for `family`
    ///
    /// Does nothing when a package of the family is already registered
    /// from that directory. Otherwise every registered package of the family
    /// is removed, the manifest is registered in development mode and any
    /// backed up game data is restored.
    pub async fn register(&self, game_directory: &Path, family: &str) -> LaunchpadResult<()> {
        let packages = self.registry.find_packages(family).await?;

        if let Some(current) = packages
            .iter()
            .find(|p| p.install_location.as_deref() == Some(game_directory))
        {
            info!(
                "Skipping package removal - same path: {} {}",
                current.full_name,
                game_directory.display()
            );
            return Ok(());
        }

        for package in &packages {
            self.remove_package(package, family).await?;
        }

        info!("Registering package from {}", game_directory.display());
        self.registry
            .register_package(
                &game_directory.join(MANIFEST_FILE),
                DeploymentOptions {
                    development_mode: true,
                },
            )
            .await?;
        info!("App re-register done");

        self.restore_backup(family).await
    }

    /// Remove every package of `family` registered from `game_directory`
    ///
    /// Packages whose location can no longer be resolved count as matching.
    pub async fn unregister(&self, family: &str, game_directory: &Path) -> LaunchpadResult<()> {
        for package in self.registry.find_packages(family).await? {
            let matches = match package.install_location.as_deref() {
                None => true,
                Some(location) => location == game_directory,
            };
            if matches {
                self.remove_package(&package, family).await?;
            }
        }
        Ok(())
    }

    async fn remove_package(&self, package: &PackageRecord, family: &str) -> LaunchpadResult<()> {
        let options = if package.is_development_mode {
            debug!("Removing development package {}", package.full_name);
            RemovalOptions {
                preserve_application_data: true,
            }
        } else {
            let data_dir = self.data_store.local_data_path(family)?;
            self.backup.back_up(&data_dir)?;
            debug!("Removing package {}", package.full_name);
            RemovalOptions::default()
        };

        self.registry
            .remove_package(&package.full_name, options)
            .await?;
        debug!("Removal of package done: {}", package.full_name);
        Ok(())
    }

    async fn restore_backup(&self, family: &str) -> LaunchpadResult<()> {
        if !self.backup.is_occupied() {
            return Ok(());
        }

        let data_dir = self.data_store.local_data_path(family)?;
        let backup = self.backup.clone();
        let resolver = Arc::clone(&self.resolver);
        tokio::task::spawn_blocking(move || backup.restore_into(&data_dir, resolver.as_ref()))
            .await
            .map_err(|e| LaunchpadError::Package(format!("Restore task failed: {}", e)))??;
        Ok(())
    }
}
