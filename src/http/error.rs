use reqwest::StatusCode;
use thiserror::Error;

use crate::settings::error::SettingsError;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("server refused link ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("could not reach server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("linked, but failed to store the link: {0}")]
    Settings(#[from] SettingsError),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("server refused playlist ({status}): {reason}")]
    Rejected { status: StatusCode, reason: String },

    #[error("failed to encode tracks: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("could not reach server: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Text shown to the user for a non-200 response
pub(crate) fn reason_text(status: StatusCode, body: String) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        body.to_string()
    }
}
