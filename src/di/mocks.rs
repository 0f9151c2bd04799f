//! Mock implementations of service traits for testing

use super::traits::{
    AppDataStore, BrokerResponse, ConfigProvider, ConflictAction, ConflictResolver,
    DeploymentOptions, IdentityBroker, PackageRecord, PackageRegistry, ProcessActivator,
    RemovalOptions, RestoreConflict,
};
use crate::config::ConflictPolicy;
use crate::core::{LaunchpadError, LaunchpadResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock configuration provider for testing
///
/// # Example
///
/// ```
/// use launchpad::di::mocks::MockConfigProvider;
/// use launchpad::di::ConfigProvider;
///
/// let mut config = MockConfigProvider::default();
/// config.delete_archive_after_download = false;
///
/// assert_eq!(config.delete_archive_after_download(), false);
/// ```
#[derive(Clone)]
pub struct MockConfigProvider {
    pub update_endpoint: String,
    pub trusted_download_prefix: String,
    pub versions_dir: PathBuf,
    pub download_dir: PathBuf,
    pub delete_archive_after_download: bool,
    pub backup_staging_dir: PathBuf,
    pub conflict_policy: ConflictPolicy,
    pub token_helper: Option<String>,
}

impl MockConfigProvider {
    /// Config with every directory placed under `root`
    pub fn in_dir(root: &Path) -> Self {
        Self {
            versions_dir: root.join("versions"),
            download_dir: root.join("downloads"),
            backup_staging_dir: root.join("TmpLocalState"),
            ..Default::default()
        }
    }
}

impl Default for MockConfigProvider {
    fn default() -> Self {
        Self {
            update_endpoint: "http://localhost/ClientWebService/client.asmx/secured".to_string(),
            trusted_download_prefix: "http://tlu.dl.delivery.mp.microsoft.com/".to_string(),
            versions_dir: PathBuf::from("/tmp/launchpad-test/versions"),
            download_dir: PathBuf::from("/tmp/launchpad-test/downloads"),
            delete_archive_after_download: true,
            backup_staging_dir: PathBuf::from("/tmp/launchpad-test/TmpLocalState"),
            conflict_policy: ConflictPolicy::Replace,
            token_helper: None,
        }
    }
}

impl ConfigProvider for MockConfigProvider {
    fn update_endpoint(&self) -> &str {
        &self.update_endpoint
    }

    fn trusted_download_prefix(&self) -> &str {
        &self.trusted_download_prefix
    }

    fn versions_dir(&self) -> LaunchpadResult<PathBuf> {
        Ok(self.versions_dir.clone())
    }

    fn download_dir(&self) -> LaunchpadResult<PathBuf> {
        Ok(self.download_dir.clone())
    }

    fn delete_archive_after_download(&self) -> bool {
        self.delete_archive_after_download
    }

    fn backup_staging_dir(&self) -> LaunchpadResult<PathBuf> {
        Ok(self.backup_staging_dir.clone())
    }

    fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }

    fn token_helper(&self) -> Option<&str> {
        self.token_helper.as_deref()
    }
}

/// Mock identity broker answering with a fixed response
///
/// Counts calls; an optional delay widens the window in which concurrent
/// callers could race each other.
pub struct MockIdentityBroker {
    response: BrokerResponse,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockIdentityBroker {
    pub fn new(response: BrokerResponse) -> Self {
        Self {
            response,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of times the broker was asked for a token
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IdentityBroker for MockIdentityBroker {
    fn request_token(&self) -> BrokerResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.response.clone()
    }
}

/// A call received by [`MockPackageRegistry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    Find(String),
    Register(PathBuf, DeploymentOptions),
    Remove(String, RemovalOptions),
}

/// Mock package registry keeping packages in memory
///
/// Registering a manifest installs a development-mode package of the
/// family set with [`MockPackageRegistry::registers_as`], located at the
/// manifest's directory.
#[derive(Clone, Default)]
pub struct MockPackageRegistry {
    packages: Arc<Mutex<HashMap<String, Vec<PackageRecord>>>>,
    calls: Arc<Mutex<Vec<RegistryCall>>>,
    register_family: Arc<Mutex<Option<String>>>,
    fail_register: Arc<Mutex<Option<String>>>,
}

impl MockPackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an installed package to a family
    pub fn add_package(&self, family: &str, record: PackageRecord) {
        self.packages
            .lock()
            .unwrap()
            .entry(family.to_string())
            .or_default()
            .push(record);
    }

    pub fn registers_as(&self, family: &str) {
        *self.register_family.lock().unwrap() = Some(family.to_string());
    }

    /// Make every registration fail with `message`
    pub fn fail_register_with(&self, message: &str) {
        *self.fail_register.lock().unwrap() = Some(message.to_string());
    }

    pub fn packages(&self, family: &str) -> Vec<PackageRecord> {
        self.packages
            .lock()
            .unwrap()
            .get(family)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change the registry (registrations and removals)
    pub fn mutations(&self) -> Vec<RegistryCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, RegistryCall::Find(_)))
            .collect()
    }
}

#[async_trait]
impl PackageRegistry for MockPackageRegistry {
    async fn find_packages(&self, family: &str) -> LaunchpadResult<Vec<PackageRecord>> {
        self.calls
            .lock()
            .unwrap()
            .push(RegistryCall::Find(family.to_string()));
        Ok(self.packages(family))
    }

    async fn register_package(
        &self,
        manifest: &Path,
        options: DeploymentOptions,
    ) -> LaunchpadResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RegistryCall::Register(manifest.to_path_buf(), options));

        if let Some(message) = self.fail_register.lock().unwrap().clone() {
            return Err(LaunchpadError::PackageOperation(message));
        }

        let family = self.register_family.lock().unwrap().clone();
        if let Some(family) = family {
            let location = manifest.parent().map(Path::to_path_buf);
            let full_name = format!("{}!dev{}", family, self.packages(&family).len());
            self.add_package(
                &family,
                PackageRecord {
                    full_name,
                    install_location: location,
                    is_development_mode: options.development_mode,
                },
            );
        }
        Ok(())
    }

    async fn remove_package(
        &self,
        full_name: &str,
        options: RemovalOptions,
    ) -> LaunchpadResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RegistryCall::Remove(full_name.to_string(), options));

        let mut packages = self.packages.lock().unwrap();
        let mut found = false;
        for records in packages.values_mut() {
            let before = records.len();
            records.retain(|r| r.full_name != full_name);
            found |= records.len() != before;
        }
        if found {
            Ok(())
        } else {
            Err(LaunchpadError::PackageOperation(format!(
                "Package not found: {}",
                full_name
            )))
        }
    }
}

/// Mock app data store mapping families to `<root>/<family>/LocalState`
#[derive(Clone)]
pub struct MockAppDataStore {
    root: PathBuf,
}

impl MockAppDataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AppDataStore for MockAppDataStore {
    fn local_data_path(&self, family: &str) -> LaunchpadResult<PathBuf> {
        Ok(self.root.join(family).join("LocalState"))
    }
}

/// Mock process activator recording activated families
#[derive(Clone, Default)]
pub struct MockProcessActivator {
    activations: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockProcessActivator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn activations(&self) -> Vec<String> {
        self.activations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessActivator for MockProcessActivator {
    async fn activate(&self, family: &str) -> LaunchpadResult<()> {
        if self.fail {
            return Err(LaunchpadError::PackageOperation(format!(
                "Failed to activate {}",
                family
            )));
        }
        self.activations.lock().unwrap().push(family.to_string());
        Ok(())
    }
}

/// Mock conflict resolver answering every conflict the same way
#[derive(Clone)]
pub struct MockConflictResolver {
    action: ConflictAction,
    seen: Arc<Mutex<Vec<RestoreConflict>>>,
}

impl MockConflictResolver {
    pub fn new(action: ConflictAction) -> Self {
        Self {
            action,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replacing() -> Self {
        Self::new(ConflictAction::Replace)
    }

    pub fn skipping() -> Self {
        Self::new(ConflictAction::Skip)
    }

    /// Conflicts presented so far
    pub fn conflicts(&self) -> Vec<RestoreConflict> {
        self.seen.lock().unwrap().clone()
    }
}

impl ConflictResolver for MockConflictResolver {
    fn resolve(&self, conflict: &RestoreConflict) -> ConflictAction {
        self.seen.lock().unwrap().push(conflict.clone());
        self.action
    }
}
