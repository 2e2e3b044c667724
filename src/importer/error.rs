use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot tell the format of {}, expected a name like 'mix.m3u'", path.display())]
    MissingFormatTag { path: PathBuf },

    #[error("invalid filetype \".{tag}\"")]
    UnsupportedFormat { tag: String },

    #[error("failed to open playlist {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse playlist {}: {source:#}", path.display())]
    Parse {
        path: PathBuf,
        source: anyhow::Error,
    },
}

impl ImportError {
    /// Errors that only concern the file at hand, the batch goes on
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ImportError::MissingFormatTag { .. } | ImportError::UnsupportedFormat { .. }
        )
    }
}
