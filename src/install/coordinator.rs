use crate::auth::TokenProvider;
use crate::core::path::absolute;
use crate::core::version::VersionEntry;
use crate::core::{LaunchpadError, LaunchpadResult};
use crate::di::{ConfigProvider, ProcessActivator, ServiceContainer};
use crate::install::state::{InstallEvent, InstallationState, StateGuard, StateSnapshot, VersionSlot};
use crate::package::{BackupSlot, PackageExtractor, PackageLifecycleManager, VersionDownloader};
use crate::protocol::ProtocolClient;
use futures::StreamExt;
use reqwest::Client;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 256;

/// Outcome of [`InstallCoordinator::cleanup`]
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<VersionEntry>,
    pub failed: Vec<(VersionEntry, LaunchpadError)>,
}

/// Runs download, launch and remove operations on versions
///
/// Each version (keyed by game directory) runs at most one operation at a
/// time, and at most one launch runs process-wide.
pub struct InstallCoordinator {
    config: Arc<dyn ConfigProvider>,
    anonymous: VersionDownloader,
    authenticated: VersionDownloader,
    lifecycle: PackageLifecycleManager,
    activator: Arc<dyn ProcessActivator>,
    slots: Mutex<HashMap<PathBuf, Arc<VersionSlot>>>,
    launch_in_flight: AtomicBool,
    events: broadcast::Sender<InstallEvent>,
}

/// Clears the process-wide launch flag on drop
struct LaunchGuard<'a>(&'a AtomicBool);

impl Drop for LaunchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl InstallCoordinator {
    pub fn new(container: &ServiceContainer) -> LaunchpadResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("launchpad/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http(container, http)
    }

    pub fn with_http(container: &ServiceContainer, http: Client) -> LaunchpadResult<Self> {
        let protocol = ProtocolClient::from_config(http.clone(), container.config());
        let anonymous = VersionDownloader::anonymous(http.clone(), protocol.clone());
        let authenticated = VersionDownloader::authenticated(
            http,
            protocol,
            TokenProvider::new(Arc::clone(&container.broker)),
        );
        let lifecycle = PackageLifecycleManager::new(
            Arc::clone(&container.registry),
            Arc::clone(&container.data_store),
            BackupSlot::new(container.config().backup_staging_dir()?),
            Arc::clone(&container.resolver),
        );
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            config: Arc::clone(&container.config),
            anonymous,
            authenticated,
            lifecycle,
            activator: Arc::clone(&container.activator),
            slots: Mutex::new(HashMap::new()),
            launch_in_flight: AtomicBool::new(false),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InstallEvent> {
        self.events.subscribe()
    }

    pub fn backup_slot(&self) -> &BackupSlot {
        self.lifecycle.backup_slot()
    }

    pub fn state_of(&self, entry: &VersionEntry) -> StateSnapshot {
        self.slot(entry).snapshot()
    }

    pub fn is_state_changing(&self, entry: &VersionEntry) -> bool {
        self.slot(entry).is_state_changing()
    }

    /// Request cancellation of the version's running operation
    pub fn cancel(&self, entry: &VersionEntry) -> bool {
        self.slot(entry).cancel()
    }

    fn slot(&self, entry: &VersionEntry) -> Arc<VersionSlot> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            slots
                .entry(entry.game_directory.clone())
                .or_insert_with(|| Arc::new(VersionSlot::new(entry.game_directory.clone()))),
        )
    }

    fn begin(&self, entry: &VersionEntry, start: InstallationState) -> LaunchpadResult<StateGuard> {
        self.slot(entry).try_begin(start, self.events.clone())
    }

    fn begin_launch(&self) -> LaunchpadResult<LaunchGuard<'_>> {
        self.launch_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LaunchpadError::Busy("Another launch is in progress".to_string()))?;
        Ok(LaunchGuard(&self.launch_in_flight))
    }

    fn refresh_status(&self, entry: &VersionEntry) {
        let _ = self.events.send(InstallEvent::StatusRefresh {
            directory: entry.game_directory.clone(),
        });
    }

    fn downloader_for(&self, entry: &VersionEntry) -> &VersionDownloader {
        if entry.kind().requires_authentication() {
            &self.authenticated
        } else {
            &self.anonymous
        }
    }

    /// Download, unpack and prepare a version for launch
    ///
    /// Cancellation deletes the partial archive and fails with `Cancelled`.
    pub async fn download(&self, entry: &VersionEntry) -> LaunchpadResult<()> {
        if !entry.identity.has_network_identity() {
            return Err(LaunchpadError::Package(format!(
                "{} has no update identity and cannot be downloaded",
                entry.display_name()
            )));
        }

        let guard = self.begin(entry, InstallationState::Initializing)?;
        let cancel = guard.attach_cancellation();
        let downloader = self.downloader_for(entry);

        if downloader.is_authenticated() {
            info!("Waiting for authentication");
            downloader.enable_user_authorization().await?;
            info!("Authentication complete");
        }

        let archive = self.config.download_dir()?.join(entry.archive_file_name());
        info!(
            "Download start: {} ({} revision {})",
            entry.display_name(),
            entry.identity.id,
            entry.identity.revision
        );

        let mut stream = downloader.download(
            &entry.identity.id,
            &entry.identity.revision,
            &archive,
            cancel,
        );
        while let Some(progress) = stream.next().await {
            if guard.state() == InstallationState::Initializing {
                debug!("Actual download started");
                guard.advance(InstallationState::Downloading);
            }
            guard.set_progress(progress);
        }

        match stream.finish().await {
            Ok(_) => {}
            Err(LaunchpadError::Cancelled) => {
                info!("Download cancelled: {}", entry.display_name());
                remove_partial(&archive).await;
                return Err(LaunchpadError::Cancelled);
            }
            Err(e) => return Err(e),
        }

        guard.advance(InstallationState::Extracting);
        let extractor = PackageExtractor::new(entry.game_directory.clone());
        let archive_path = archive.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&archive_path))
            .await
            .map_err(|e| LaunchpadError::Extraction(format!("Extraction task failed: {}", e)))??;

        if self.config.delete_archive_after_download() {
            tokio::fs::remove_file(&archive).await?;
        } else {
            debug!("Keeping archive {}", archive.display());
        }

        drop(guard);
        self.refresh_status(entry);
        info!("Extracted successfully: {}", entry.display_name());
        Ok(())
    }

    /// Register the version's package (unless already current) and start it
    pub async fn launch(&self, entry: &VersionEntry) -> LaunchpadResult<()> {
        let _launching = self.begin_launch()?;
        let guard = self.begin(entry, InstallationState::Registering)?;

        let game_directory = absolute(&entry.game_directory)?;
        let family = entry.package_family();
        self.lifecycle.register(&game_directory, family).await?;

        guard.advance(InstallationState::Launching);
        info!("Launching {}", family);
        self.activator.activate(family).await?;
        info!("App launch finished: {}", entry.display_name());
        Ok(())
    }

    /// Unregister the version's package and delete its game directory
    pub async fn remove(&self, entry: &VersionEntry) -> LaunchpadResult<()> {
        let guard = self.begin(entry, InstallationState::Uninstalling)?;

        let game_directory = absolute(&entry.game_directory)?;
        self.lifecycle
            .unregister(entry.package_family(), &game_directory)
            .await?;

        if game_directory.exists() {
            tokio::fs::remove_dir_all(&game_directory).await?;
        }

        drop(guard);
        self.refresh_status(entry);
        info!("Removed version {}", entry.display_name());
        Ok(())
    }

    /// Versions with an install directory under the versions directory
    pub fn installed_entries(&self) -> LaunchpadResult<Vec<VersionEntry>> {
        let versions_dir = self.config.versions_dir()?;
        if !versions_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for dir in std::fs::read_dir(&versions_dir)? {
            let dir = dir?;
            if !dir.file_type()?.is_dir() {
                continue;
            }
            let name = dir.file_name();
            match name
                .to_str()
                .and_then(|n| VersionEntry::from_install_dir(n, &versions_dir))
            {
                Some(entry) => entries.push(entry),
                None => debug!("Skipping {}", dir.path().display()),
            }
        }
        entries.sort_by(|a, b| a.game_directory.cmp(&b.game_directory));
        Ok(entries)
    }

    /// Remove every installed version, in both package families
    ///
    /// Clears the way for reinstalling the store build. Game data is kept,
    /// and a version that fails to remove does not stop the others.
    pub async fn cleanup(&self) -> LaunchpadResult<CleanupReport> {
        let mut report = CleanupReport::default();
        for entry in self.installed_entries()? {
            match self.remove(&entry).await {
                Ok(()) => report.removed.push(entry),
                Err(e) => {
                    warn!("Failed to remove {}: {}", entry.display_name(), e);
                    report.failed.push((entry, e));
                }
            }
        }
        info!(
            "Cleanup finished: {} removed, {} failed",
            report.removed.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

async fn remove_partial(archive: &Path) {
    match tokio::fs::remove_file(archive).await {
        Ok(()) => debug!("Deleted partial download {}", archive.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Failed to delete partial download {}: {}",
            archive.display(),
            e
        ),
    }
}
