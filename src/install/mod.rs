pub mod coordinator;
pub mod state;

pub use coordinator::{CleanupReport, InstallCoordinator};
pub use state::{InstallEvent, InstallationState, StateSnapshot, VersionSlot};
