//! Turning playlist files into tracks.
//!
//! Parsers are registered per format tag, the part of the file name after
//! its last dot. New formats only need a [`PlaylistParser`] and a call to
//! [`ParserRegistry::register`].

use std::{
    collections::HashMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{config::ImportConfig, domain::track::Track, importer::error::ImportError};

pub mod error;
pub mod m3u;
mod metadata;

/// Converts one playlist file into its ordered list of tracks
pub trait PlaylistParser {
    fn parse(&self, file: &mut dyn Read, config: &ImportConfig) -> anyhow::Result<Vec<Track>>;
}

impl<F> PlaylistParser for F
where
    F: Fn(&mut dyn Read, &ImportConfig) -> anyhow::Result<Vec<Track>>,
{
    fn parse(&self, file: &mut dyn Read, config: &ImportConfig) -> anyhow::Result<Vec<Track>> {
        self(file, config)
    }
}

/// A playlist file given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub path: PathBuf,
    /// File name without the format tag, used as the playlist's name on the server
    pub name: String,
    /// Lowercase text after the last dot of the file name
    pub format: String,
}

impl PlaylistRef {
    /// Splits the file name on its last dot: `my.mix.m3u` is playlist
    /// `my.mix` in format `m3u`. Names without a dot, or with nothing on
    /// either side of it, have no format.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let missing = || ImportError::MissingFormatTag {
            path: path.to_path_buf(),
        };

        let file_name = path.file_name().ok_or_else(missing)?.to_string_lossy();
        match file_name.rsplit_once('.') {
            Some((name, tag)) if !name.is_empty() && !tag.is_empty() => Ok(Self {
                path: path.to_path_buf(),
                name: name.to_string(),
                format: tag.to_lowercase(),
            }),
            _ => Err(missing()),
        }
    }
}

#[derive(Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, Box<dyn PlaylistParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every parser shipped with this crate
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register("m3u", m3u::M3uParser)
            .register("m3u8", m3u::M3uParser);
        registry
    }

    /// Adds a parser for `tag`, replacing any parser registered for it before
    pub fn register<P>(&mut self, tag: &str, parser: P) -> &mut Self
    where
        P: PlaylistParser + 'static,
    {
        self.parsers.insert(tag.to_lowercase(), Box::new(parser));
        self
    }

    pub fn get(&self, tag: &str) -> Option<&dyn PlaylistParser> {
        self.parsers.get(&tag.to_lowercase()).map(|p| p.as_ref())
    }

    /// Registered tags in alphabetical order
    pub fn formats(&self) -> Vec<&str> {
        let mut formats: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        formats.sort_unstable();
        formats
    }
}

pub struct ImportDispatcher {
    registry: ParserRegistry,
    config: ImportConfig,
}

impl ImportDispatcher {
    pub fn new(registry: ParserRegistry, config: ImportConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    pub fn resolve_parser(&self, playlist: &PlaylistRef) -> Result<&dyn PlaylistParser, ImportError> {
        self.registry
            .get(&playlist.format)
            .ok_or_else(|| ImportError::UnsupportedFormat {
                tag: playlist.format.clone(),
            })
    }

    /// Parses the playlist with the parser registered for its format.
    ///
    /// Tracks are returned exactly as the parser produced them.
    pub fn import(&self, playlist: &PlaylistRef) -> Result<Vec<Track>, ImportError> {
        let parser = self.resolve_parser(playlist)?;

        let mut file = File::open(&playlist.path).map_err(|source| ImportError::Io {
            path: playlist.path.clone(),
            source,
        })?;
        let tracks = parser
            .parse(&mut file, &self.config)
            .map_err(|source| ImportError::Parse {
                path: playlist.path.clone(),
                source,
            })?;

        debug!(
            "parsed {} tracks from {} as {}",
            tracks.len(),
            playlist.path.display(),
            playlist.format
        );
        Ok(tracks)
    }
}
