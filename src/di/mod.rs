//! Dependency injection infrastructure for Launchpad
//!
//! Every OS capability the install pipeline touches (identity broker,
//! package registry, app data store, process activation, conflict prompts)
//! sits behind a trait so the pipeline can run against mocks.
//!
//! # Example (Production)
//! ```no_run
//! use launchpad::di::ServiceContainer;
//!
//! # fn example() -> launchpad::core::LaunchpadResult<()> {
//! let container = ServiceContainer::new()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example (Testing)
//! ```
//! use launchpad::di::{ServiceContainer, BrokerResponse, mocks::*};
//! use std::sync::Arc;
//!
//! # fn example() {
//! let container = ServiceContainer::with_providers(
//!     Arc::new(MockConfigProvider::default()),
//!     Arc::new(MockIdentityBroker::new(BrokerResponse::success("token"))),
//!     Arc::new(MockPackageRegistry::new()),
//!     Arc::new(MockAppDataStore::new("/tmp/launchpad-test-data")),
//!     Arc::new(MockProcessActivator::new()),
//!     Arc::new(MockConflictResolver::replacing()),
//! );
//! # }
//! ```

pub mod container;
pub mod mocks;
pub mod traits;

pub use container::ServiceContainer;
pub use traits::{
    AppDataStore, BrokerResponse, ConfigProvider, ConflictAction, ConflictResolver,
    DeploymentOptions, IdentityBroker, PackageRecord, PackageRegistry, ProcessActivator,
    RemovalOptions, RestoreConflict,
};
