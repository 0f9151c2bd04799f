use clap::{Parser, Subcommand};
use launchpad::core::LaunchpadError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::VersionArgs;

/// Conventional exit status for a run interrupted with Ctrl-C
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(about = "Download, install and launch versioned app packages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and unpack a version
    Download(VersionArgs),
    /// Register a downloaded version and start it
    Launch(VersionArgs),
    /// Unregister a version and delete its files
    Remove(VersionArgs),
    /// Show where a version lives and whether it is installed
    Status(VersionArgs),
    /// Uninstall every installed version, keeping game data
    Cleanup {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Download(args) => cli::download::run(args).await,
        Commands::Launch(args) => cli::launch::run(args).await,
        Commands::Remove(args) => cli::remove::run(args).await,
        Commands::Status(args) => cli::status::run(args),
        Commands::Cleanup { yes } => cli::cleanup::run(yes).await,
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Path => cli::config::path(),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(LaunchpadError::Cancelled) => {
            eprintln!("\nCancelled");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            eprintln!("\n{}", launchpad::format_error_with_help(&e));
            ExitCode::FAILURE
        }
    }
}
