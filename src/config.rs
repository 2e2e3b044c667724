use std::fmt::Display;

use anyhow::{Context, bail};
use reqwest::Url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_SETTINGS_FILE: &str = "./settings.txt";

/// Flags handed to every playlist parser for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportConfig {
    /// Keep entries whose local file does not exist
    pub add_missing: bool,
    /// Attach a content hash to every track whose file exists
    pub hash: bool,
    /// Prefer `#EXTINF` data over the audio file's own tags
    pub prefer_ext_metadata: bool,
}

/// Base url of the playlstr server, always without a trailing slash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrl(String);

impl ServerUrl {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).with_context(|| format!("invalid server url '{raw}'"))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            bail!("server url '{raw}' must be an http(s) url");
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins `path` onto the base url, `path` must not start with a slash
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path)
    }

    pub fn link_endpoint(&self) -> String {
        self.join("client-link/")
    }

    pub fn import_endpoint(&self) -> String {
        self.join("client-import/")
    }

    /// Page where users obtain a link code
    pub fn link_help_url(&self) -> String {
        self.join("link")
    }

    /// Browsable url of an imported playlist
    pub fn playlist_url(&self, playlist_id: &str) -> String {
        self.join(&format!("list/{playlist_id}/"))
    }
}

impl Display for ServerUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
