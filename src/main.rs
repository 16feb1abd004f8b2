//! Rotation Preview - what a listener has been playing, with previews.
//!
//! Pulls a listener's recent top albums from Last.fm, matches each one to a
//! Spotify album with a playable 30-second preview, and serves the result to
//! a web UI. Previews can also be played directly from the terminal.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod matching;
pub mod preview;
pub mod server;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("rotation_preview=info".parse()?))
        .init();

    cli::run_command(&args)
}
