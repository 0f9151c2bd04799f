use crate::config::ConflictPolicy;
use crate::di::{ConflictAction, ConflictResolver, RestoreConflict};
use dialoguer::Confirm;
use std::sync::Arc;
use tracing::warn;

/// Answers every restore conflict the same way
#[derive(Debug, Clone, Copy)]
pub struct FixedResolver(pub ConflictAction);

impl ConflictResolver for FixedResolver {
    fn resolve(&self, _conflict: &RestoreConflict) -> ConflictAction {
        self.0
    }
}

/// Asks on the terminal for each conflict
///
/// Falls back to keeping the existing file when no answer can be read.
pub struct PromptResolver;

impl PromptResolver {
    fn prompt(conflict: &RestoreConflict) -> String {
        match conflict {
            RestoreConflict::FileExists(path) => format!(
                "The file {} already exists in the destination. Replace it? The old file will be lost.",
                path.display()
            ),
            RestoreConflict::NotADirectory(path) => format!(
                "{} is a file but the backup holds a directory there. Replace it? The file will be lost.",
                path.display()
            ),
        }
    }
}

impl ConflictResolver for PromptResolver {
    fn resolve(&self, conflict: &RestoreConflict) -> ConflictAction {
        match Confirm::new()
            .with_prompt(Self::prompt(conflict))
            .default(false)
            .interact()
        {
            Ok(true) => ConflictAction::Replace,
            Ok(false) => ConflictAction::Skip,
            Err(e) => {
                warn!(
                    "Failed to read answer for {}, keeping existing file: {}",
                    conflict.path().display(),
                    e
                );
                ConflictAction::Skip
            }
        }
    }
}

/// Resolver implementing a configured conflict policy
pub fn resolver_for_policy(policy: ConflictPolicy) -> Arc<dyn ConflictResolver> {
    match policy {
        ConflictPolicy::Ask => Arc::new(PromptResolver),
        ConflictPolicy::Replace => Arc::new(FixedResolver(ConflictAction::Replace)),
        ConflictPolicy::Skip => Arc::new(FixedResolver(ConflictAction::Skip)),
    }
}
