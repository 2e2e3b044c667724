//! Plain and extended M3U playlists.
//!
//! ```text
//! #EXTM3U
//! #EXTINF:367,Aphex Twin - Windowlicker
//! /music/windowlicker.flac
//! ```
//!
//! Every non-comment line is a track. An `#EXTINF` line describes the
//! track on the next non-comment line.

use std::{io::Read, path::Path};

use encoding_rs::WINDOWS_1252;
use log::{debug, warn};

use crate::{
    config::ImportConfig,
    domain::{hash::ContentHash, track::Track},
    importer::{
        PlaylistParser,
        metadata::{TrackInfo, read_tags},
    },
};

const EXTINF: &str = "#EXTINF:";
const BOM: &str = "\u{feff}";

pub struct M3uParser;

impl PlaylistParser for M3uParser {
    fn parse(&self, file: &mut dyn Read, config: &ImportConfig) -> anyhow::Result<Vec<Track>> {
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let tracks = parse_entries(&decode(&bytes))
            .into_iter()
            .filter_map(|entry| build_track(entry, config))
            .collect();
        Ok(tracks)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    location: String,
    extinf: Option<TrackInfo>,
}

/// UTF-8 when valid, Windows-1252 otherwise, which is what most `.m3u` writers produce
fn decode(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("playlist is not valid UTF-8, decoding as Windows-1252");
            WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned()
        }
    };
    match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

fn parse_entries(text: &str) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut pending = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(EXTINF) {
            pending = Some(parse_extinf(rest));
        } else if !line.starts_with('#') {
            entries.push(Entry {
                location: line.to_string(),
                extinf: pending.take(),
            });
        }
    }
    entries
}

/// Parses `<seconds> [attributes],<artist> - <title>`
fn parse_extinf(rest: &str) -> TrackInfo {
    let (head, display) = rest.split_once(',').unwrap_or((rest, ""));

    let duration = head
        .split_whitespace()
        .next()
        .and_then(|secs| secs.parse::<f64>().ok())
        .filter(|secs| *secs > 0.0)
        .map(|secs| secs.round() as u64);

    let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
    let (artist, title) = match display.split_once(" - ") {
        Some((artist, title)) => (non_empty(artist), non_empty(title)),
        None => (None, non_empty(display)),
    };

    TrackInfo {
        title,
        artist,
        album: None,
        duration,
    }
}

fn build_track(entry: Entry, config: &ImportConfig) -> Option<Track> {
    let path = Path::new(entry.location.strip_prefix("file://").unwrap_or(&entry.location));
    let exists = path.is_file();

    if !exists && !config.add_missing {
        warn!("skipping {}: file not found", entry.location);
        return None;
    }

    let tags = if exists {
        read_tags(path).unwrap_or_else(|e| {
            debug!("no tags for {}: {e:#}", entry.location);
            TrackInfo::default()
        })
    } else {
        TrackInfo::default()
    };

    let extinf = entry.extinf.unwrap_or_default();
    let info = if config.prefer_ext_metadata {
        extinf.or(tags)
    } else {
        tags.or(extinf)
    };

    let hash = if config.hash && exists {
        match ContentHash::from_file(path) {
            Ok(hash) => Some(hash.to_hex()),
            Err(e) => {
                warn!("failed to hash {}: {e:#}", entry.location);
                None
            }
        }
    } else {
        None
    };

    Some(Track {
        filename: entry.location,
        title: info.title,
        artist: info.artist,
        album: info.album,
        duration: info.duration,
        hash,
    })
}
