//! Local identity record of this client installation

use std::{
    fmt::Display,
    fs::{self, File},
    path::{Path, PathBuf},
};

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::settings::error::SettingsError;

pub mod error;

const CLIENT_ID_LEN: usize = 20;
const CLIENT_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Identifies this installation to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Random id of lowercase ascii letters and digits, not checked for uniqueness
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let id = (0..CLIENT_ID_LEN)
            .map(|_| CLIENT_ID_CHARSET[rng.random_range(0..CLIENT_ID_CHARSET.len())] as char)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether this client is bound to a server-side account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Unlinked,
    Linked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub id: ClientId,
    /// Link code acknowledged by the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Keys this version does not know about, written back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    pub fn fresh() -> Self {
        Self {
            id: ClientId::generate(),
            link: None,
            extra: Map::new(),
        }
    }

    pub fn link_state(&self) -> LinkState {
        match self.link.as_deref() {
            Some(link) if !link.is_empty() => LinkState::Linked,
            _ => LinkState::Unlinked,
        }
    }
}

/// On-disk shape, where every known key may be absent
#[derive(Deserialize)]
struct StoredSettings {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<StoredSettings> for Settings {
    fn from(stored: StoredSettings) -> Self {
        let id = match stored.id {
            Some(id) if !id.is_empty() => ClientId(id),
            _ => {
                info!("settings have no client id, generating one");
                ClientId::generate()
            }
        };
        Self {
            id,
            link: stored.link,
            extra: stored.extra,
        }
    }
}

/// JSON file holding [`Settings`].
///
/// Writes are plain overwrites: an interrupted save leaves a truncated
/// file behind, which the next [`SettingsStore::load`] reports as
/// [`SettingsError::Decode`].
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads settings, creating an empty file first if there is none.
    ///
    /// An empty file yields fresh settings. A malformed one is left as is
    /// and reported as a recoverable [`SettingsError::Decode`].
    pub fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.is_file() {
            debug!("creating empty settings file {}", self.path.display());
            File::create(&self.path).map_err(|e| self.io_error(e))?;
        }

        let contents = fs::read(&self.path).map_err(|e| self.io_error(e))?;
        if contents.iter().all(u8::is_ascii_whitespace) {
            info!("settings file {} is empty, generating client id", self.path.display());
            return Ok(Settings::fresh());
        }

        let stored: StoredSettings =
            serde_json::from_slice(&contents).map_err(|source| SettingsError::Decode {
                path: self.path.clone(),
                source,
            })?;
        Ok(stored.into())
    }

    /// Overwrites the whole file with `settings`
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_string(settings).map_err(SettingsError::Encode)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        debug!("saved settings to {}", self.path.display());
        Ok(())
    }

    /// Truncates the settings file, the next load behaves as for a new file
    pub fn clear(&self) -> Result<(), SettingsError> {
        File::create(&self.path).map_err(|e| self.io_error(e))?;
        info!("cleared settings file {}", self.path.display());
        Ok(())
    }

    /// Replaces a corrupt file with freshly generated settings
    pub fn reset(&self) -> Result<Settings, SettingsError> {
        self.clear()?;
        let settings = self.load()?;
        self.save(&settings)?;
        Ok(settings)
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
