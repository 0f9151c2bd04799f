//! Integration tests module
//!
//! CLI behavior through the built binary, and the install pipeline through
//! the library API with mocked OS services.

pub mod cli;
pub mod common;
pub mod pipeline;
