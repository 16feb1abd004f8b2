//! Interactive preview playback.
//!
//! Reads one command per line from stdin. Between reads the controller's
//! lifecycle events and finished catalog lookups are applied.

use std::io::BufRead;
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError, unbounded};
use tokio::runtime::Runtime;

use crate::error::ResultExt;
use crate::matching::{Resolution, RotationEntry};
use crate::preview::{DeviceBackend, Gesture, PreviewController, PreviewSource, PreviewStatus};

use super::lookup::{describe_resolution, print_rotation};
use super::{Cli, build_services};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    /// Press the play button of the 1-based album number
    Press(usize),
    Pause,
    Status,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    match line {
        "p" | "pause" => Some(Input::Pause),
        "s" | "status" => Some(Input::Status),
        "h" | "help" | "?" => Some(Input::Help),
        "q" | "quit" | "exit" => Some(Input::Quit),
        _ => match line.parse::<usize>() {
            Ok(n) if n > 0 => Some(Input::Press(n)),
            _ => None,
        },
    }
}

fn print_help() {
    println!("Commands:");
    println!("  <n>   play/pause album n");
    println!("  p     pause");
    println!("  s     show status");
    println!("  q     quit");
}

/// Play previews for the current rotation
///
/// Albums are listed as soon as the history arrives; each one becomes
/// playable when its catalog lookup finishes.
pub fn cmd_preview(rt: &Runtime, cli: &Cli, touch: bool) -> anyhow::Result<()> {
    let services = build_services(cli)?;
    if !services.config.credentials.has_catalog() {
        anyhow::bail!("Spotify API credentials not configured");
    }

    let records = rt
        .block_on(services.history.top_albums())
        .with_context("fetching listening history")?;
    let mut rotation: Vec<RotationEntry> = records.into_iter().map(RotationEntry::pending).collect();

    print_rotation(&rotation);
    if rotation.is_empty() {
        return Ok(());
    }
    println!();
    print_help();

    let backend = DeviceBackend::new(rt.handle().clone(), services.http.clone())
        .with_volume(services.config.preview.volume);
    let mut controller = PreviewController::new(Box::new(backend));
    controller.set_rotation(&rotation);

    let (resolved_tx, resolved_rx) = unbounded::<(usize, Resolution)>();
    for (index, entry) in rotation.iter().enumerate() {
        let resolver = services.resolver.clone();
        let album = entry.record.album.clone();
        let artist = entry.record.artist.clone();
        let tx = resolved_tx.clone();
        rt.spawn(async move {
            let found = resolver.resolve_or_none(&album, &artist).await;
            let _ = tx.send((index, Resolution::from_match(found)));
        });
    }
    drop(resolved_tx);

    let gesture = if touch {
        Gesture::Touch
    } else {
        Gesture::Pointer
    };
    let lines = spawn_stdin_reader()?;

    let mut last_status = controller.status();
    'session: loop {
        controller.wait_event(POLL_INTERVAL);

        for (index, resolution) in resolved_rx.try_iter() {
            if let Some(entry) = rotation.get_mut(index) {
                entry.resolution = resolution;
                controller.update_preview(index, PreviewSource::from(&entry.resolution));
                println!(
                    "{:>3}. {}",
                    index + 1,
                    describe_resolution(&entry.resolution)
                );
            }
        }

        loop {
            let line = match lines.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => break,
                // stdin closed
                Err(TryRecvError::Disconnected) => break 'session,
            };
            match parse_input(&line) {
                Some(Input::Press(n)) if n <= rotation.len() => {
                    controller.on_gesture(n - 1, gesture);
                }
                Some(Input::Press(n)) => {
                    println!("No album {} (1-{})", n, rotation.len());
                }
                Some(Input::Pause) => controller.pause(),
                Some(Input::Status) => print_status(&controller, &rotation),
                Some(Input::Help) => print_help(),
                Some(Input::Quit) => break 'session,
                None if line.trim().is_empty() => {}
                None => println!("Unknown command '{}', type h for help", line.trim()),
            }
        }

        controller.process_events();

        let status = controller.status();
        if status != last_status {
            print_transition(status, &rotation);
            last_status = status;
        }
    }

    controller.pause();
    Ok(())
}

fn spawn_stdin_reader() -> std::io::Result<Receiver<String>> {
    let (tx, rx) = unbounded();
    std::thread::Builder::new()
        .name("preview-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

fn album_label(rotation: &[RotationEntry], index: usize) -> String {
    rotation
        .get(index)
        .map(|e| format!("{} - {}", e.record.artist, e.record.album))
        .unwrap_or_else(|| format!("album {}", index + 1))
}

fn print_transition(status: PreviewStatus, rotation: &[RotationEntry]) {
    match status {
        PreviewStatus::Idle => println!("⏹ stopped"),
        PreviewStatus::Loading(i) => println!("… loading {}", album_label(rotation, i)),
        PreviewStatus::Playing(i) => println!("▶ playing {}", album_label(rotation, i)),
    }
}

/// Marker shown next to an album in the status listing.
fn status_marker(status: PreviewStatus, source: Option<&PreviewSource>, index: usize) -> &'static str {
    if status.is_playing(index) {
        "▶"
    } else if status.is_loading(index) {
        "…"
    } else {
        match source {
            Some(PreviewSource::Available(_)) => " ",
            Some(PreviewSource::Pending) | None => "?",
            Some(PreviewSource::Unavailable) => "✗",
        }
    }
}

fn print_status(controller: &PreviewController, rotation: &[RotationEntry]) {
    let status = controller.status();
    for index in 0..rotation.len() {
        let marker = status_marker(status, controller.sources().get(index), index);
        println!("{} {:>3}. {}", marker, index + 1, album_label(rotation, index));
    }
    if let Some(progress) = controller.progress() {
        println!("  {} ({:.0}%)", progress.display(), progress.fraction() * 100.0);
    }
}
