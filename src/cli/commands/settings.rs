//! Config file inspection and creation.

use crate::config::{self, Config, Credentials};

use super::Cli;

/// Show the effective configuration, optionally writing a default file
pub fn cmd_config(cli: &Cli, init: bool) -> anyhow::Result<()> {
    let path = match cli.config {
        Some(ref p) => p.clone(),
        None => config::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?,
    };

    if init {
        if path.exists() {
            println!("Config file already exists: {}", path.display());
        } else {
            let written = match cli.config {
                Some(ref p) => {
                    config::save_to(&Config::default(), p)?;
                    p.clone()
                }
                None => config::save(&Config::default())?,
            };
            println!("Wrote default config to {}", written.display());
        }
        println!();
    }

    let config = cli.load_config();
    println!("Config file: {}", path.display());
    println!();
    for line in describe(&config) {
        println!("{}", line);
    }
    Ok(())
}

/// Human-readable summary. Secrets are reported as set/unset only.
fn describe(config: &Config) -> Vec<String> {
    let Credentials {
        spotify_client_id,
        spotify_client_secret,
        lastfm_api_key,
        lastfm_username,
    } = &config.credentials;

    vec![
        format!("  Spotify client ID:     {}", presence(spotify_client_id)),
        format!("  Spotify client secret: {}", presence(spotify_client_secret)),
        format!("  Last.fm API key:       {}", presence(lastfm_api_key)),
        format!(
            "  Last.fm username:      {}",
            lastfm_username.as_deref().unwrap_or("(not set)")
        ),
        format!("  Server bind:           {}", config.server.bind),
        format!(
            "  History:               top {} for {}",
            config.history.limit, config.history.period
        ),
        format!("  Preview volume:        {:.0}%", config.preview.volume * 100.0),
    ]
}

fn presence(value: &Option<String>) -> &'static str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => "set",
        _ => "(not set)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_hides_secrets() {
        let mut config = Config::default();
        config.credentials.spotify_client_secret = Some("super-secret".to_string());
        config.credentials.lastfm_username = Some("listener".to_string());

        let text = describe(&config).join("\n");
        assert!(!text.contains("super-secret"));
        assert!(text.contains("Spotify client secret: set"));
        assert!(text.contains("listener"));
        assert!(text.contains("top 2 for 1month"));
    }
}
