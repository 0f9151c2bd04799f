//! Update service protocol
//!
//! Resolves a version identity to a download location through a SOAP
//! `GetExtendedUpdateInfo2` exchange.

pub mod client;
pub mod envelope;

pub use client::ProtocolClient;
