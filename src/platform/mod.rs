//! Production implementations of the capabilities in [`crate::di::traits`].
//!
//! Package operations go through PowerShell's Appx cmdlets and the identity
//! broker is reached through a helper executable, so the crate builds on
//! any host; the operations themselves only succeed on Windows.

pub mod appdata;
pub mod broker;
pub mod powershell;

pub use appdata::LocalAppDataStore;
pub use broker::HelperProcessBroker;
pub use powershell::{PowerShellRegistry, ShellActivator};
