use super::VersionArgs;
use indicatif::{ProgressBar, ProgressStyle};
use launchpad::core::{LaunchpadError, LaunchpadResult};
use launchpad::di::ServiceContainer;
use launchpad::install::{InstallCoordinator, InstallEvent, InstallationState, StateSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

pub async fn run(args: VersionArgs) -> LaunchpadResult<()> {
    let container = ServiceContainer::new()?;
    let entry = args.entry(container.config())?;
    let coordinator = Arc::new(InstallCoordinator::new(&container)?);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .map_err(|e| LaunchpadError::Package(format!("Invalid progress template: {}", e)))?
            .progress_chars("#>-"),
    );

    let mut events = coordinator.subscribe();
    let watched = entry.game_directory.clone();
    let reporter_pb = pb.clone();
    let reporter = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(InstallEvent::StateChanged {
                    directory,
                    snapshot,
                }) if directory == watched => render(&reporter_pb, &snapshot),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    let cancel_coordinator = Arc::clone(&coordinator);
    let cancel_entry = entry.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_coordinator.cancel(&cancel_entry);
        }
    });

    let result = coordinator.download(&entry).await;
    interrupt.abort();
    reporter.abort();

    match result {
        Ok(()) => {
            pb.finish_and_clear();
            println!(
                "✓ Installed {} to {}",
                entry.display_name(),
                entry.game_directory.display()
            );
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e)
        }
    }
}

fn render(pb: &ProgressBar, snapshot: &StateSnapshot) {
    if snapshot.state.is_progress_indeterminate() {
        pb.enable_steady_tick(Duration::from_millis(120));
    } else {
        pb.disable_steady_tick();
    }
    if snapshot.state == InstallationState::Downloading {
        if let Some(total) = snapshot.total_bytes {
            pb.set_length(total);
        }
        pb.set_position(snapshot.bytes_transferred);
    }
    pb.set_message(snapshot.display_status());
}
