use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings file {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode settings: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("settings file {} is not accessible: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SettingsError {
    /// Only a malformed file can be fixed by clearing it
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SettingsError::Decode { .. })
    }
}
