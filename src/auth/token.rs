use crate::core::AuthError;
use crate::di::IdentityBroker;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// First status of the broker's own error range.
const ERRORS_START: i32 = 0x8004_0200u32 as i32;
const NO_ACCOUNT: i32 = 0x8004_0200u32 as i32;

/// Token-fetch failures carry a broker request status in the low byte.
const TOKEN_FETCH_ERROR_BASE: i32 = 0x8004_0300u32 as i32;
const TOKEN_FETCH_ERROR_END: i32 = 0x8004_0400u32 as i32;

const ERRORS_END: i32 = 0x8004_0400u32 as i32;

/// Opaque bearer token for the update service
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<{} bytes redacted>)", self.0.len())
    }
}

/// Web token request statuses the broker can embed in a token-fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerStatus {
    Success,
    UserCancel,
    AccountSwitch,
    UserInteractionRequired,
    AccountProviderNotAvailable,
    ProviderError,
}

impl BrokerStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(BrokerStatus::Success),
            1 => Some(BrokerStatus::UserCancel),
            2 => Some(BrokerStatus::AccountSwitch),
            3 => Some(BrokerStatus::UserInteractionRequired),
            4 => Some(BrokerStatus::AccountProviderNotAvailable),
            5 => Some(BrokerStatus::ProviderError),
            _ => None,
        }
    }
}

/// Classify a non-zero broker status.
pub fn decode_status(status: i32) -> AuthError {
    if (ERRORS_START..=ERRORS_END).contains(&status) {
        if (TOKEN_FETCH_ERROR_BASE..TOKEN_FETCH_ERROR_END).contains(&status) {
            return decode_token_fetch(status);
        }
        if status == NO_ACCOUNT {
            return AuthError::NoAccount;
        }
    }
    AuthError::Os { code: status }
}

fn decode_token_fetch(status: i32) -> AuthError {
    let code = (status & 0xff) as u8;
    let violation = |detail: &str| AuthError::BrokerContractViolation {
        status,
        detail: detail.to_string(),
    };

    match BrokerStatus::from_code(code) {
        None => violation("unknown token request status"),
        // The interactive call resolves these itself; seeing them as failures is a bug.
        Some(BrokerStatus::Success) => violation("success reported as failure"),
        Some(BrokerStatus::UserCancel) => violation("user cancelled the token request"),
        Some(BrokerStatus::AccountSwitch) => violation("user requested an account switch"),
        Some(BrokerStatus::UserInteractionRequired) => {
            violation("user interaction required to complete the token request")
        }
        Some(BrokerStatus::AccountProviderNotAvailable) => AuthError::ProviderUnavailable,
        Some(BrokerStatus::ProviderError) => AuthError::ProviderError,
    }
}

/// Acquires update service tokens from the identity broker
#[derive(Clone)]
pub struct TokenProvider {
    broker: Arc<dyn IdentityBroker>,
}

impl TokenProvider {
    pub fn new(broker: Arc<dyn IdentityBroker>) -> Self {
        Self { broker }
    }

    /// Blocking: the broker may show sign-in UI.
    pub fn acquire_token(&self) -> Result<Token, AuthError> {
        let response = self.broker.request_token();
        debug!("Identity broker returned status 0x{:08X}", response.status);

        if response.status != 0 {
            return Err(decode_status(response.status));
        }

        match response.token {
            Some(token) if !token.is_empty() => Ok(Token(token)),
            _ => Err(AuthError::BrokerContractViolation {
                status: 0,
                detail: "success without a token".to_string(),
            }),
        }
    }
}
