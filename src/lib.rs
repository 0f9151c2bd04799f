//! Launchpad: acquisition and installation of versioned app packages
//!
//! This crate resolves builds through the vendor update service, streams them
//! to disk, unpacks them and (un)registers them with the OS package registry
//! while keeping the user's game data safe across reinstalls.

pub use launchpad_core::{
    format_error_with_help, AuthError, ErrorHelp, LaunchpadError, LaunchpadResult,
};

/// Core module re-exported from `launchpad-core`.
pub mod core {
    pub use launchpad_core::core::*;
}

/// Configuration management.
pub mod config;

/// Dependency injection infrastructure.
pub mod di;

/// Identity broker token acquisition.
pub mod auth;

/// Update service protocol client.
pub mod protocol;

/// Package acquisition, extraction and OS registration.
pub mod package;

/// Per-version installation state machine and operation coordinator.
pub mod install;

/// Platform implementations of the injected capabilities.
pub mod platform;
