//! Error types for csar-core

/// Result type for csar-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while working on an archive
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Transparent wrappers for underlying crate errors
    /// Unpacking or repacking failed
    #[error(transparent)]
    Archive(#[from] csar_archive::Error),

    /// Manifest or resolver settings error
    #[error(transparent)]
    Meta(#[from] csar_meta::Error),

    /// Service template or descriptor error
    #[error(transparent)]
    Tosca(#[from] csar_tosca::Error),

    /// Filesystem error from csar-fs
    #[error(transparent)]
    Fs(#[from] csar_fs::Error),

    /// Package fetcher failure, passed through unmodified
    #[error(transparent)]
    Fetch(#[from] crate::fetch::FetchError),
}
