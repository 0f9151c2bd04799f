//! Service container for dependency injection

use super::traits::{
    AppDataStore, ConfigProvider, ConflictResolver, IdentityBroker, PackageRegistry,
    ProcessActivator,
};
use crate::config::Config;
use crate::core::LaunchpadResult;
use crate::package::interactive::resolver_for_policy;
use crate::platform::{HelperProcessBroker, LocalAppDataStore, PowerShellRegistry, ShellActivator};
use std::sync::Arc;

/// Service container for dependency injection
///
/// Holds every OS-facing service as a trait object so tests can swap in
/// the implementations from [`super::mocks`].
///
/// # Example (Production)
///
/// ```no_run
/// use launchpad::di::ServiceContainer;
///
/// # fn example() -> launchpad::core::LaunchpadResult<()> {
/// let container = ServiceContainer::new()?;
/// println!("Update endpoint: {}", container.config().update_endpoint());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ServiceContainer {
    pub config: Arc<dyn ConfigProvider>,
    pub broker: Arc<dyn IdentityBroker>,
    pub registry: Arc<dyn PackageRegistry>,
    pub data_store: Arc<dyn AppDataStore>,
    pub activator: Arc<dyn ProcessActivator>,
    pub resolver: Arc<dyn ConflictResolver>,
}

impl ServiceContainer {
    /// Create a new service container with production implementations
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Config file cannot be loaded or created
    /// - The local app data directory cannot be determined
    pub fn new() -> LaunchpadResult<Self> {
        let config = Config::load()?;
        Self::from_config(config)
    }

    /// Create production services around an already loaded config
    pub fn from_config(config: Config) -> LaunchpadResult<Self> {
        let broker = HelperProcessBroker::new(config.token_helper.clone());
        let data_store = LocalAppDataStore::new()?;
        let resolver = resolver_for_policy(config.conflict_policy);

        Ok(Self {
            config: Arc::new(config),
            broker: Arc::new(broker),
            registry: Arc::new(PowerShellRegistry::new()),
            data_store: Arc::new(data_store),
            activator: Arc::new(ShellActivator::new()),
            resolver,
        })
    }

    /// Create a service container with custom providers (for testing)
    pub fn with_providers(
        config: Arc<dyn ConfigProvider>,
        broker: Arc<dyn IdentityBroker>,
        registry: Arc<dyn PackageRegistry>,
        data_store: Arc<dyn AppDataStore>,
        activator: Arc<dyn ProcessActivator>,
        resolver: Arc<dyn ConflictResolver>,
    ) -> Self {
        Self {
            config,
            broker,
            registry,
            data_store,
            activator,
            resolver,
        }
    }

    pub fn config(&self) -> &dyn ConfigProvider {
        self.config.as_ref()
    }

    pub fn registry(&self) -> &dyn PackageRegistry {
        self.registry.as_ref()
    }

    pub fn data_store(&self) -> &dyn AppDataStore {
        self.data_store.as_ref()
    }
}
