use super::VersionArgs;
use launchpad::config::Config;
use launchpad::core::LaunchpadResult;
use launchpad::package::BackupSlot;

pub fn run(args: VersionArgs) -> LaunchpadResult<()> {
    let config = Config::load()?;
    let entry = args.entry(&config)?;

    println!("{} ({})", entry.display_name(), entry.kind());
    println!("  Package family: {}", entry.package_family());
    println!("  Directory:      {}", entry.game_directory.display());
    if entry.is_installed() {
        println!("  Status:         installed");
    } else {
        println!("  Status:         not installed");
    }

    let slot = BackupSlot::new(config.get_backup_staging_dir()?);
    if slot.is_occupied() {
        println!();
        println!(
            "⚠️  Unrestored game data backup at {}",
            slot.path().display()
        );
        println!("   It is restored on the next launch; move it away manually to discard it.");
    }
    Ok(())
}
