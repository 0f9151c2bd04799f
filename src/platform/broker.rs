use crate::di::{BrokerResponse, IdentityBroker};
use serde::Deserialize;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Executable looked up on PATH when no helper is configured
pub const DEFAULT_HELPER: &str = "wu-token-helper";

/// E_FAIL
const GENERIC_FAILURE: i32 = 0x8000_4005u32 as i32;
/// E_UNEXPECTED
const UNEXPECTED: i32 = 0x8000_FFFFu32 as i32;
/// HRESULT_FROM_WIN32(ERROR_FILE_NOT_FOUND)
const HELPER_NOT_FOUND: i32 = 0x8007_0002u32 as i32;

#[derive(Debug, Deserialize)]
struct HelperOutput {
    status: i32,
    #[serde(default)]
    token: Option<String>,
}

/// Identity broker reached through a helper process
///
/// The helper performs the interactive token request and prints one JSON
/// object: `{"status": <HRESULT>, "token": <string or null>}`.
pub struct HelperProcessBroker {
    configured: Option<String>,
}

impl HelperProcessBroker {
    pub fn new(configured: Option<String>) -> Self {
        Self { configured }
    }

    fn locate(&self) -> Option<PathBuf> {
        match &self.configured {
            Some(path) => Some(PathBuf::from(path)),
            None => which::which(DEFAULT_HELPER).ok(),
        }
    }
}

impl IdentityBroker for HelperProcessBroker {
    fn request_token(&self) -> BrokerResponse {
        let Some(helper) = self.locate() else {
            warn!("Token helper '{}' not found on PATH", DEFAULT_HELPER);
            return BrokerResponse::failure(HELPER_NOT_FOUND);
        };

        debug!("Running token helper {}", helper.display());
        let output = match Command::new(&helper).output() {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to run token helper {}: {}", helper.display(), e);
                return BrokerResponse::failure(status_from_io(&e));
            }
        };

        if !output.status.success() {
            debug!(
                "Token helper exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        parse_helper_output(&output.stdout)
    }
}

fn parse_helper_output(stdout: &[u8]) -> BrokerResponse {
    match serde_json::from_slice::<HelperOutput>(stdout) {
        Ok(parsed) => BrokerResponse {
            status: parsed.status,
            token: parsed.token,
        },
        Err(e) => {
            warn!("Unreadable token helper output: {}", e);
            BrokerResponse::failure(UNEXPECTED)
        }
    }
}

fn status_from_io(error: &io::Error) -> i32 {
    match error.raw_os_error() {
        Some(code) => (0x8007_0000u32 | (code as u32 & 0xffff)) as i32,
        None if error.kind() == io::ErrorKind::NotFound => HELPER_NOT_FOUND,
        None => GENERIC_FAILURE,
    }
}
