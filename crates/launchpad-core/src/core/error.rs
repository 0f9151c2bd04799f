use std::path::PathBuf;
use thiserror::Error;

pub type LaunchpadResult<T> = Result<T, LaunchpadError>;

#[derive(Error, Debug)]
pub enum LaunchpadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport failure or a non-success HTTP status.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The update service returned no trusted download location for this
    /// identity/revision pair.
    #[error("Bad update identity: {id} (revision {revision})")]
    BadIdentity { id: String, revision: String },

    /// The operation was aborted by the user. Not a failure to report.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The backup staging slot is already occupied by data from an earlier,
    /// unrecovered operation. The occupying data is never touched.
    #[error("Backup staging directory already exists: {}", .0.display())]
    BackupConflict(PathBuf),

    /// Registration or removal reported as failed by the OS package registry.
    #[error("Package operation failed: {0}")]
    PackageOperation(String),

    /// Another operation owns the version (or the system-wide launch slot).
    #[error("Busy: {0}")]
    Busy(String),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Package error: {0}")]
    Package(String),
}

impl LaunchpadError {
    /// User-initiated aborts are reported distinctly so callers can stay quiet.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, LaunchpadError::Cancelled)
    }
}

/// Failures of the identity broker token request.
///
/// `Clone` so a single failed login can be handed to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No Microsoft account found")]
    NoAccount,

    /// The broker answered with something the interactive call should never
    /// produce. Always a bug signal.
    #[error("Identity broker returned an invalid result 0x{status:08X}: {detail} (this is a bug)")]
    BrokerContractViolation { status: i32, detail: String },

    #[error("Xbox Live account services are currently unavailable")]
    ProviderUnavailable,

    #[error("Unknown Xbox Live error")]
    ProviderError,

    #[error("Identity broker failed with OS error 0x{code:08X}")]
    Os { code: i32 },
}

impl AuthError {
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, AuthError::BrokerContractViolation { .. })
    }
}
