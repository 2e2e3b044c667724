//! Importing and uploading a list of playlist files, one after another

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::{
    http::{client::ApiClient, error::UploadError},
    importer::{ImportDispatcher, PlaylistRef, error::ImportError},
    link::LinkedClient,
};

#[derive(Debug)]
pub enum FileOutcome {
    Imported {
        playlist_id: String,
        url: String,
        tracks: usize,
    },
    /// The file was not sent, its format is unknown
    Skipped(ImportError),
    /// The server refused the playlist
    Rejected(UploadError),
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub imported: usize,
    pub skipped: usize,
    pub rejected: usize,
}

pub struct ImportSession<'a> {
    dispatcher: &'a ImportDispatcher,
    client: &'a ApiClient,
    account: LinkedClient<'a>,
}

impl<'a> ImportSession<'a> {
    pub fn new(
        dispatcher: &'a ImportDispatcher,
        client: &'a ApiClient,
        account: LinkedClient<'a>,
    ) -> Self {
        Self {
            dispatcher,
            client,
            account,
        }
    }

    /// Imports every playlist in order, handing each outcome to `on_report`
    /// as soon as it is known.
    ///
    /// Unknown formats and refused uploads only affect their own file.
    /// Anything else (unreadable files, parser failures, an unreachable
    /// server) stops the batch and is returned.
    pub fn run<P, F>(&self, playlists: &[P], mut on_report: F) -> anyhow::Result<BatchSummary>
    where
        P: AsRef<Path>,
        F: FnMut(&FileReport),
    {
        let mut summary = BatchSummary::default();

        for path in playlists {
            let path = path.as_ref();
            let outcome = self.import_one(path)?;

            match &outcome {
                FileOutcome::Imported { .. } => summary.imported += 1,
                FileOutcome::Skipped(_) => summary.skipped += 1,
                FileOutcome::Rejected(_) => summary.rejected += 1,
            }
            on_report(&FileReport {
                path: path.to_path_buf(),
                outcome,
            });
        }

        info!(
            "batch done: {} imported, {} skipped, {} rejected",
            summary.imported, summary.skipped, summary.rejected
        );
        Ok(summary)
    }

    fn import_one(&self, path: &Path) -> anyhow::Result<FileOutcome> {
        let tracks = PlaylistRef::from_path(path)
            .and_then(|playlist| Ok((self.dispatcher.import(&playlist)?, playlist)));
        let (tracks, playlist) = match tracks {
            Ok(parsed) => parsed,
            Err(e) if e.is_skippable() => {
                warn!("skipping {}: {e}", path.display());
                return Ok(FileOutcome::Skipped(e));
            }
            Err(e) => return Err(e.into()),
        };

        match self
            .client
            .upload(&playlist.name, &tracks, self.account.client_id())
        {
            Ok(playlist_id) => Ok(FileOutcome::Imported {
                url: self.client.server().playlist_url(&playlist_id),
                playlist_id,
                tracks: tracks.len(),
            }),
            Err(e @ UploadError::Rejected { .. }) => {
                warn!("server refused {}: {e}", path.display());
                Ok(FileOutcome::Rejected(e))
            }
            Err(e) => Err(e.into()),
        }
    }
}
