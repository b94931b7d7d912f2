//! Error types for csar-meta

use std::path::PathBuf;

use crate::prompt::Slot;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] csar_fs::Error),

    #[error("Invalid manifest at {path}, line {line}: {message}")]
    ManifestParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("No value available for {slot}: {source}")]
    PromptFailed {
        slot: Slot,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid resolution policy: {policy} cannot be stored")]
    InvalidPolicySelection { policy: String },
}
