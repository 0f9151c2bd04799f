//! Identity broker token acquisition
//!
//! The broker is an OS service reached through [`IdentityBroker`]; this
//! module turns its numeric status into [`AuthError`] kinds.
//!
//! [`IdentityBroker`]: crate::di::IdentityBroker
//! [`AuthError`]: crate::core::AuthError

pub mod token;

pub use token::{decode_status, BrokerStatus, Token, TokenProvider};
