//! Package fetching into the archive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use csar_fs::{CsarPath, NormalizedPath};

/// Media type for Debian packages.
pub const DEBIAN_PACKAGE_MEDIA_TYPE: &str = "application/vnd.debian.binary-package";

/// Media type for any other artifact.
pub const OCTET_STREAM_MEDIA_TYPE: &str = "application/octet-stream";

/// Errors reported by a [`PackageFetcher`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Package '{package}' not found in {source_dir}")]
    NotFound { package: String, source_dir: PathBuf },

    #[error("Failed to copy package from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A package placed into the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPackage {
    /// Name the package is referred to by in dependency edges
    pub reference: String,
    /// Workspace-relative location of the copied artifact
    pub artifact: NormalizedPath,
    pub media_type: String,
}

/// Puts a package artifact into a workspace.
///
/// Failures are returned as-is; callers do not retry.
pub trait PackageFetcher {
    fn fetch(&mut self, package: &str, workspace: &Path) -> Result<FetchedPackage, FetchError>;
}

/// Fetches packages from a local directory into `Content/Packages/`.
///
/// A file matches when its name is the package name itself or the
/// package name followed by an extension (`nginx.deb`). Files are
/// considered in name order and the first match wins.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    source_dir: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    fn find(&self, package: &str) -> Result<Option<PathBuf>, FetchError> {
        let io_error = |source| FetchError::Io {
            path: self.source_dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.source_dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            if entry.file_type().map_err(io_error)?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        let prefix = format!("{package}.");
        Ok(names
            .into_iter()
            .find(|name| name == package || name.starts_with(&prefix))
            .map(|name| self.source_dir.join(name)))
    }
}

impl PackageFetcher for DirectoryFetcher {
    fn fetch(&mut self, package: &str, workspace: &Path) -> Result<FetchedPackage, FetchError> {
        let Some(source) = self.find(package)? else {
            return Err(FetchError::NotFound {
                package: package.to_string(),
                source_dir: self.source_dir.clone(),
            });
        };
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| package.to_string());

        let artifact = NormalizedPath::new(CsarPath::PackagesDir.as_str()).join(&file_name);
        let target = artifact.under(workspace);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| FetchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::copy(&source, &target).map_err(|e| FetchError::Io {
            path: source.clone(),
            source: e,
        })?;

        let media_type = match artifact.extension() {
            Some("deb") => DEBIAN_PACKAGE_MEDIA_TYPE,
            _ => OCTET_STREAM_MEDIA_TYPE,
        };
        tracing::debug!(package, artifact = %artifact, "Copied package");
        Ok(FetchedPackage {
            reference: package.to_string(),
            artifact,
            media_type: media_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copies_matching_file() {
        let packages = TempDir::new().unwrap();
        let workspace = TempDir::new().unwrap();
        fs::write(packages.path().join("nginx-extras.deb"), "x").unwrap();
        fs::write(packages.path().join("nginx.deb"), "deb").unwrap();

        let fetched = DirectoryFetcher::new(packages.path())
            .fetch("nginx", workspace.path())
            .unwrap();

        assert_eq!(fetched.artifact.as_str(), "Content/Packages/nginx.deb");
        assert_eq!(fetched.media_type, DEBIAN_PACKAGE_MEDIA_TYPE);
        let copied = fs::read_to_string(workspace.path().join("Content/Packages/nginx.deb")).unwrap();
        assert_eq!(copied, "deb");
    }

    #[test]
    fn missing_package_is_not_found() {
        let packages = TempDir::new().unwrap();
        let workspace = TempDir::new().unwrap();

        let err = DirectoryFetcher::new(packages.path())
            .fetch("curl", workspace.path())
            .unwrap_err();

        assert!(matches!(err, FetchError::NotFound { .. }));
    }
}
