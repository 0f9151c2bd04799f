use crate::core::{LaunchpadError, LaunchpadResult};
use crate::package::DownloadProgress;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Phase of the single operation a version can be going through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InstallationState {
    Idle = 0,
    Initializing = 1,
    Downloading = 2,
    Extracting = 3,
    Registering = 4,
    Launching = 5,
    Uninstalling = 6,
}

impl InstallationState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => InstallationState::Initializing,
            2 => InstallationState::Downloading,
            3 => InstallationState::Extracting,
            4 => InstallationState::Registering,
            5 => InstallationState::Launching,
            6 => InstallationState::Uninstalling,
            _ => InstallationState::Idle,
        }
    }

    /// Whether progress for this phase can only be shown as a spinner
    pub fn is_progress_indeterminate(&self) -> bool {
        !matches!(self, InstallationState::Idle | InstallationState::Downloading)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstallationState::Idle => "Idle",
            InstallationState::Initializing => "Preparing...",
            InstallationState::Downloading => "Downloading...",
            InstallationState::Extracting => "Extracting...",
            InstallationState::Registering => "Registering package...",
            InstallationState::Launching => "Launching...",
            InstallationState::Uninstalling => "Uninstalling...",
        }
    }
}

impl fmt::Display for InstallationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Point-in-time view of a version's state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    pub state: InstallationState,
    pub bytes_transferred: u64,
    pub total_bytes: Option<u64>,
}

impl StateSnapshot {
    pub fn display_status(&self) -> String {
        const MIB: f64 = 1024.0 * 1024.0;
        match (self.state, self.total_bytes) {
            (InstallationState::Downloading, Some(total)) => format!(
                "Downloading... {:.0}MiB/{:.0}MiB",
                self.bytes_transferred as f64 / MIB,
                total as f64 / MIB
            ),
            (InstallationState::Downloading, None) => format!(
                "Downloading... {:.0}MiB",
                self.bytes_transferred as f64 / MIB
            ),
            (state, _) => state.label().to_string(),
        }
    }
}

/// Notifications published by the install coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEvent {
    /// A version changed phase or made download progress
    StateChanged {
        directory: PathBuf,
        snapshot: StateSnapshot,
    },
    /// Installed-ness of a version may have changed
    StatusRefresh { directory: PathBuf },
}

const UNKNOWN_TOTAL: u64 = u64::MAX;

/// Lock-free state cell of one version
pub struct VersionSlot {
    directory: PathBuf,
    state: AtomicU8,
    transferred: AtomicU64,
    total: AtomicU64,
    cancel: Mutex<Option<CancellationToken>>,
}

impl VersionSlot {
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            state: AtomicU8::new(InstallationState::Idle as u8),
            transferred: AtomicU64::new(0),
            total: AtomicU64::new(UNKNOWN_TOTAL),
            cancel: Mutex::new(None),
        }
    }

    pub fn state(&self) -> InstallationState {
        InstallationState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_state_changing(&self) -> bool {
        self.state() != InstallationState::Idle
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let state = self.state();
        if state != InstallationState::Downloading {
            return StateSnapshot {
                state,
                bytes_transferred: 0,
                total_bytes: None,
            };
        }
        let total = self.total.load(Ordering::Relaxed);
        StateSnapshot {
            state,
            bytes_transferred: self.transferred.load(Ordering::Relaxed),
            total_bytes: (total != UNKNOWN_TOTAL).then_some(total),
        }
    }

    /// Atomically move from `Idle` to `start`
    ///
    /// Fails with `Busy` if another operation holds the slot. The returned
    /// guard puts the slot back to `Idle` when dropped, whatever the outcome.
    pub fn try_begin(
        self: &Arc<Self>,
        start: InstallationState,
        events: broadcast::Sender<InstallEvent>,
    ) -> LaunchpadResult<StateGuard> {
        self.state
            .compare_exchange(
                InstallationState::Idle as u8,
                start as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|current| {
                LaunchpadError::Busy(format!(
                    "{} is busy: {}",
                    self.directory.display(),
                    InstallationState::from_u8(current)
                ))
            })?;

        let guard = StateGuard {
            slot: Arc::clone(self),
            events,
        };
        guard.publish();
        Ok(guard)
    }

    /// Request cancellation of the running operation; false if there is
    /// nothing to cancel.
    pub fn cancel(&self) -> bool {
        match self.lock_cancel().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn lock_cancel(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.cancel.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Ownership of a version's state for the duration of one operation
pub struct StateGuard {
    slot: Arc<VersionSlot>,
    events: broadcast::Sender<InstallEvent>,
}

impl StateGuard {
    pub fn state(&self) -> InstallationState {
        self.slot.state()
    }

    pub fn advance(&self, next: InstallationState) {
        self.slot.state.store(next as u8, Ordering::Release);
        self.publish();
    }

    pub fn set_progress(&self, progress: DownloadProgress) {
        self.slot
            .transferred
            .store(progress.bytes_transferred, Ordering::Relaxed);
        self.slot
            .total
            .store(progress.total_bytes.unwrap_or(UNKNOWN_TOTAL), Ordering::Relaxed);
        self.publish();
    }

    /// Cancellation token observed by this operation
    pub fn attach_cancellation(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.slot.lock_cancel() = Some(token.clone());
        token
    }

    fn publish(&self) {
        // No subscribers is fine.
        let _ = self.events.send(InstallEvent::StateChanged {
            directory: self.slot.directory.clone(),
            snapshot: self.slot.snapshot(),
        });
    }
}

impl Drop for StateGuard {
    fn drop(&mut self) {
        *self.slot.lock_cancel() = None;
        self.slot.transferred.store(0, Ordering::Relaxed);
        self.slot.total.store(UNKNOWN_TOTAL, Ordering::Relaxed);
        self.slot
            .state
            .store(InstallationState::Idle as u8, Ordering::Release);
        self.publish();
    }
}
