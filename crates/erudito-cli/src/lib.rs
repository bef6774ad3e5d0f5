//! Library interface for erudito-cli
//!
//! Exposes the command handlers and the HTTP router for integration testing
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Test allows"
    )
)]

/// Command-line argument definitions.
pub mod cli;
pub mod handlers;
pub mod server;

pub use cli::{Cli, Commands};
pub use server::{AppState, router, serve};
