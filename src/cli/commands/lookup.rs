//! One-off resolver, history and rotation queries.

use tokio::runtime::Runtime;

use crate::catalog::AlbumMatch;
use crate::error::ResultExt;
use crate::history::ListeningRecord;
use crate::matching::{self, Resolution, RotationEntry};

use super::{Cli, build_services};

/// Resolve one album against the catalog
pub fn cmd_resolve(
    rt: &Runtime,
    cli: &Cli,
    album: &str,
    artist: &str,
    json: bool,
) -> anyhow::Result<()> {
    let services = build_services(cli)?;

    rt.block_on(async {
        let found = services
            .resolver
            .resolve(album, artist)
            .await
            .with_context(format!("resolving '{}' by '{}'", album, artist))?;

        if json {
            println!("{}", serde_json::to_string_pretty(&found)?);
            return Ok(());
        }

        match found {
            Some(m) => print_match(&m),
            None => println!("No match for '{}' by '{}'", album, artist),
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Show the listener's top albums
pub fn cmd_history(rt: &Runtime, cli: &Cli, json: bool) -> anyhow::Result<()> {
    let services = build_services(cli)?;

    rt.block_on(async {
        let records = services
            .history
            .top_albums()
            .await
            .with_context("fetching listening history")?;

        if json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            println!("No albums in the selected period.");
        }
        for (i, record) in records.iter().enumerate() {
            print_record(i, record);
            if let Some(art) = record.best_artwork() {
                println!("     {}", art);
            }
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Show the top albums with their matches
pub fn cmd_rotation(rt: &Runtime, cli: &Cli, json: bool) -> anyhow::Result<()> {
    let services = build_services(cli)?;

    rt.block_on(async {
        let rotation = matching::build_rotation(services.history.as_ref(), &services.resolver)
            .await
            .with_context("building rotation")?;

        if json {
            println!("{}", serde_json::to_string_pretty(&rotation)?);
            return Ok(());
        }

        print_rotation(&rotation);
        Ok::<_, anyhow::Error>(())
    })
}

pub(super) fn print_rotation(rotation: &[RotationEntry]) {
    if rotation.is_empty() {
        println!("No albums in the selected period.");
    }
    for (i, entry) in rotation.iter().enumerate() {
        print_record(i, &entry.record);
        println!("     {}", describe_resolution(&entry.resolution));
    }
}

pub(super) fn describe_resolution(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Matched(m) => match m.preview_url {
            Some(_) => format!("▶ preview available ({})", m.album_id),
            None => format!("✗ matched {} but no preview", m.album_id),
        },
        Resolution::NoMatch => "✗ not found in catalog".to_string(),
        Resolution::Pending => "… pending".to_string(),
    }
}

fn print_record(index: usize, record: &ListeningRecord) {
    println!(
        "{:>3}. {} - {} ({} plays)",
        index + 1,
        record.artist,
        record.album,
        record.play_count
    );
}

fn print_match(m: &AlbumMatch) {
    println!("✓ Match found");
    println!();
    println!("  Album:   {}", m.album_title);
    println!("  Artist:  {}", m.artist_name);
    println!("  ID:      {}", m.album_id);
    if !m.cover_url.is_empty() {
        println!("  Cover:   {}", m.cover_url);
    }
    match m.preview_url {
        Some(ref url) => println!("  Preview: {}", url),
        None => println!("  Preview: none available"),
    }
}
