use super::VersionArgs;
use launchpad::core::LaunchpadResult;
use launchpad::di::ServiceContainer;
use launchpad::install::InstallCoordinator;

pub async fn run(args: VersionArgs) -> LaunchpadResult<()> {
    let container = ServiceContainer::new()?;
    let entry = args.entry(container.config())?;

    let coordinator = InstallCoordinator::new(&container)?;
    coordinator.remove(&entry).await?;

    println!("✓ Removed {}", entry.display_name());
    println!("✓ Deleted {}", entry.game_directory.display());
    Ok(())
}
