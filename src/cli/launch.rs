use super::VersionArgs;
use launchpad::core::{LaunchpadError, LaunchpadResult};
use launchpad::di::ServiceContainer;
use launchpad::install::InstallCoordinator;

pub async fn run(args: VersionArgs) -> LaunchpadResult<()> {
    let container = ServiceContainer::new()?;
    let entry = args.entry(container.config())?;

    if !entry.is_installed() {
        return Err(LaunchpadError::Package(format!(
            "{} is not installed at {}",
            entry.display_name(),
            entry.game_directory.display()
        )));
    }

    let coordinator = InstallCoordinator::new(&container)?;
    coordinator.launch(&entry).await?;

    println!("✓ Launched {}", entry.display_name());
    Ok(())
}
