use dialoguer::Confirm;
use launchpad::core::{LaunchpadError, LaunchpadResult};
use launchpad::di::ServiceContainer;
use launchpad::install::InstallCoordinator;

pub async fn run(yes: bool) -> LaunchpadResult<()> {
    let container = ServiceContainer::new()?;
    let coordinator = InstallCoordinator::new(&container)?;

    let installed = coordinator.installed_entries()?;
    if installed.is_empty() {
        println!("No installed versions to remove");
        return Ok(());
    }

    println!("Versions installed by launchpad:");
    for entry in &installed {
        println!("  {} ({})", entry.display_name(), entry.game_directory.display());
    }
    println!("Game data (worlds, settings) is kept.");

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Uninstall all of them so the store version can be reinstalled?")
            .default(false)
            .interact()
            .map_err(|e| LaunchpadError::Package(format!("Failed to read answer: {}", e)))?;
        if !confirmed {
            println!("Nothing removed");
            return Ok(());
        }
    }

    let report = coordinator.cleanup().await?;
    for entry in &report.removed {
        println!("✓ Removed {}", entry.display_name());
    }
    for (entry, e) in &report.failed {
        println!("✗ {}: {}", entry.display_name(), e);
    }

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(LaunchpadError::PackageOperation(format!(
            "{} version(s) could not be removed",
            report.failed.len()
        )))
    }
}
