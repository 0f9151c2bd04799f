use launchpad::config::Config;
use launchpad::core::{LaunchpadError, LaunchpadResult};

/// Print the effective configuration
pub fn show() -> LaunchpadResult<()> {
    let config = Config::load()?;
    let yaml = serde_yaml::to_string(&config)
        .map_err(|e| LaunchpadError::Config(format!("Failed to serialize config: {}", e)))?;
    print!("{}", yaml);
    Ok(())
}

/// Print the config file location
pub fn path() -> LaunchpadResult<()> {
    println!("{}", Config::path()?.display());
    Ok(())
}
