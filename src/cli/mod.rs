//! Command-line interface for rotation-preview.
//!
//! This module provides commands for running the HTTP service, resolving
//! albums, inspecting listening history, and playing previews from a
//! terminal.

mod commands;

pub use commands::{Cli, Commands, run_command};
