//! Reserved locations inside an unpacked CSAR.

use std::path::Path;

/// Well-known paths inside a CSAR workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsarPath {
    /// The `TOSCA-Metadata` directory
    MetadataDir,
    /// The `TOSCA-Metadata/TOSCA.meta` manifest
    MetaFile,
    /// The `Definitions` directory holding TOSCA definitions documents
    DefinitionsDir,
    /// Where fetched package artifacts are placed
    PackagesDir,
    /// Default folder for persisted resolver settings
    ResolverDir,
}

impl CsarPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetadataDir => "TOSCA-Metadata",
            Self::MetaFile => "TOSCA-Metadata/TOSCA.meta",
            Self::DefinitionsDir => "Definitions",
            Self::PackagesDir => "Content/Packages",
            Self::ResolverDir => "References_Resolver",
        }
    }
}

impl AsRef<Path> for CsarPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for CsarPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for CsarPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
