//! Human-facing hints attached to errors.

use super::error::{AuthError, LaunchpadError};

/// Suggests what the user can do about an error.
pub trait ErrorHelp {
    fn help(&self) -> Option<String>;
}

impl ErrorHelp for LaunchpadError {
    fn help(&self) -> Option<String> {
        match self {
            LaunchpadError::BadIdentity { .. } => Some(
                "The download location could not be resolved. For beta versions, make sure \
                 your account is subscribed to the beta program in the Xbox Insider Hub."
                    .to_string(),
            ),
            LaunchpadError::BackupConflict(path) => Some(format!(
                "A previous backup of the game data was never restored. Move {} somewhere \
                 safe (or restore it by hand), then retry.",
                path.display()
            )),
            LaunchpadError::Auth(AuthError::NoAccount) => Some(
                "Sign in to a Microsoft account in the system settings, then retry.".to_string(),
            ),
            LaunchpadError::Auth(e) if e.is_contract_violation() => Some(
                "This is a bug in the identity broker integration. Please report it.".to_string(),
            ),
            LaunchpadError::Busy(_) => {
                Some("Wait for the running operation to finish and try again.".to_string())
            }
            LaunchpadError::Network(_) => {
                Some("Check your internet connection and try again.".to_string())
            }
            LaunchpadError::Config(_) => Some(
                "Run `launchpad config path` to locate the configuration file.".to_string(),
            ),
            _ => None,
        }
    }
}

/// Format an error followed by its hint, if any.
pub fn format_error_with_help(error: &LaunchpadError) -> String {
    match error.help() {
        Some(help) => format!("Error: {}\n\nHelp: {}", error, help),
        None => format!("Error: {}", error),
    }
}
