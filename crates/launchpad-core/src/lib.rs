//! Core types for Launchpad.
//!
//! Error taxonomy, platform paths and the version data model shared by the
//! main crate and its platform adapters.

pub mod core;

pub use core::error::{AuthError, LaunchpadError, LaunchpadResult};
pub use core::error_help::{format_error_with_help, ErrorHelp};
pub use core::version::{VersionEntry, VersionIdentity, VersionKind};
