//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `lookup`: one-off resolver, history and rotation queries
//! - `serve`: the HTTP service
//! - `preview`: interactive preview playback
//! - `settings`: config file inspection and creation

mod lookup;
mod preview;
mod serve;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use crate::catalog::{self, CatalogClient, ClientCredentials, TokenCache};
use crate::config::{self, Config, Credentials};
use crate::history::{LastFmClient, ListeningHistoryApi};
use crate::matching::AlbumResolver;

pub use lookup::{cmd_history, cmd_resolve, cmd_rotation};
pub use preview::cmd_preview;
pub use serve::cmd_serve;
pub use settings::cmd_config;

/// Rotation Preview CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Spotify client ID
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub spotify_client_id: Option<String>,

    /// Spotify client secret
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    /// Last.fm API key
    #[arg(long, global = true, env = "LASTFM_API_KEY", hide_env_values = true)]
    pub lastfm_api_key: Option<String>,

    /// Last.fm username
    #[arg(long, global = true, env = "LASTFM_USERNAME")]
    pub lastfm_username: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Credentials given on the command line or in the environment.
    fn credential_overrides(&self) -> Credentials {
        Credentials {
            spotify_client_id: self.spotify_client_id.clone(),
            spotify_client_secret: self.spotify_client_secret.clone(),
            lastfm_api_key: self.lastfm_api_key.clone(),
            lastfm_username: self.lastfm_username.clone(),
        }
    }

    /// Config file contents with command-line overrides applied.
    pub fn load_config(&self) -> Config {
        let mut config = match self.config {
            Some(ref path) => config::load_from(path),
            None => config::load(),
        };
        config.credentials = config.credentials.merge(self.credential_overrides());
        config
    }
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(short, long)]
        bind: Option<std::net::SocketAddr>,
    },
    /// Find the catalog album (and preview) for one album
    Resolve {
        /// Album title
        #[arg(long)]
        album: String,
        /// Artist name
        #[arg(long)]
        artist: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the listener's recent top albums
    History {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the top albums with their catalog matches
    Rotation {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Play album previews interactively
    Preview {
        /// Use touch semantics (every press toggles)
        #[arg(long)]
        touch: bool,
    },
    /// Show or create the config file
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;

    match &cli.command {
        Commands::Serve { bind } => cmd_serve(&rt, cli, *bind),
        Commands::Resolve {
            album,
            artist,
            json,
        } => cmd_resolve(&rt, cli, album, artist, *json),
        Commands::History { json } => cmd_history(&rt, cli, *json),
        Commands::Rotation { json } => cmd_rotation(&rt, cli, *json),
        Commands::Preview { touch } => cmd_preview(&rt, cli, *touch),
        Commands::Config { init } => cmd_config(cli, *init),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Clients wired from the effective configuration.
pub(crate) struct Services {
    pub config: Config,
    pub http: reqwest::Client,
    pub resolver: AlbumResolver,
    pub history: Arc<dyn ListeningHistoryApi>,
}

/// Build the resolver and history client.
///
/// Missing credentials are not an error here; each client reports them when
/// it is first used.
pub(crate) fn build_services(cli: &Cli) -> anyhow::Result<Services> {
    let config = cli.load_config();
    let http = catalog::build_http_client()?;
    let creds = &config.credentials;

    if !creds.has_catalog() {
        tracing::warn!("Spotify credentials not configured; album lookups will fail");
    }
    if !creds.has_history() {
        tracing::warn!("Last.fm credentials not configured; history lookups will fail");
    }

    let tokens = TokenCache::new(ClientCredentials::new(
        creds.spotify_client_id.clone().unwrap_or_default(),
        creds.spotify_client_secret.clone().unwrap_or_default(),
        http.clone(),
    ));
    let resolver = AlbumResolver::new(
        Arc::new(CatalogClient::with_http_client(http.clone())),
        Arc::new(tokens),
    );

    let history = LastFmClient::new(
        creds.lastfm_api_key.clone().unwrap_or_default(),
        creds.lastfm_username.clone().unwrap_or_default(),
        http.clone(),
    )
    .with_period(config.history.period.clone())
    .with_limit(config.history.limit);

    Ok(Services {
        config,
        http,
        resolver,
        history: Arc::new(history),
    })
}
