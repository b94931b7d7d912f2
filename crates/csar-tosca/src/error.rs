//! Error types for csar-tosca

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] csar_fs::Error),

    #[error("No service template found in {workspace}")]
    TemplateNotFound { workspace: PathBuf },

    #[error("Failed to parse XML at {path}: {message}")]
    XmlParse { path: PathBuf, message: String },

    #[error("Failed to write XML for {path}: {message}")]
    XmlWrite { path: PathBuf, message: String },

    #[error("Malformed service template at {path}: {message}")]
    MalformedTemplate { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::XmlParse {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::XmlWrite {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
