//! Error types for csar-archive

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Archive not found: {path}")]
    ArchiveNotFound { path: PathBuf },

    #[error("Failed to extract {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("Invalid repack target: destination filename is empty")]
    InvalidTarget,

    #[error("Failed to pack {path}: {message}")]
    Packing { path: PathBuf, message: String },

    #[error(transparent)]
    Fs(#[from] csar_fs::Error),
}
