//! The [`Archive`] facade: one unpacked CSAR and its resolver state.

use std::path::{Path, PathBuf};

use csar_archive::ArchiveWorkspace;
use csar_fs::NormalizedPath;
use csar_meta::{
    Architecture, Manifest, ManifestAudit, PersistedPolicy, ResolutionPolicy, ResolutionStore,
    StoreConfig, ValueProvider,
};
use csar_tosca::{DependencyEdge, DependencyMutator};
use serde::Serialize;

use crate::Result;
use crate::fetch::{FetchedPackage, PackageFetcher};

/// Options for [`Archive::open_with`].
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    /// Working directory; defaults to a sibling of the archive
    pub workspace_dir: Option<PathBuf>,
    /// Layout and defaults of the resolver settings
    pub store: StoreConfig,
}

/// Snapshot of an archive for display.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSummary {
    pub archive: PathBuf,
    pub architecture: String,
    pub policy: PersistedPolicy,
    pub files: Vec<NormalizedPath>,
    pub edges: Vec<DependencyEdge>,
}

/// An unpacked CSAR with its manifest, resolver settings and template.
///
/// All operations work on the workspace; nothing reaches the archive file
/// until [`Archive::pack`].
#[derive(Debug)]
pub struct Archive {
    workspace: ArchiveWorkspace,
    manifest: Manifest,
    store: ResolutionStore,
    mutator: DependencyMutator,
}

impl Archive {
    /// Unpack `path` next to itself with default settings.
    pub fn open(path: impl AsRef<Path>, provider: &mut dyn ValueProvider) -> Result<Self> {
        Self::open_with(path, ArchiveOptions::default(), provider)
    }

    /// Unpack `path`, load its manifest and resolve both settings.
    ///
    /// Settings missing from the archive are asked for through `provider`.
    /// On failure the working directory is removed again.
    pub fn open_with(
        path: impl AsRef<Path>,
        options: ArchiveOptions,
        provider: &mut dyn ValueProvider,
    ) -> Result<Self> {
        let workspace = match options.workspace_dir {
            Some(dir) => ArchiveWorkspace::open_in(path, dir)?,
            None => ArchiveWorkspace::open(path)?,
        };
        let (manifest, store) = match load_state(workspace.dir(), options.store, provider) {
            Ok(state) => state,
            Err(e) => {
                if let Err(cleanup) = workspace.discard() {
                    tracing::warn!(error = %cleanup, "Failed to discard workspace");
                }
                return Err(e);
            }
        };
        let mutator = DependencyMutator::new(workspace.dir());

        Ok(Self {
            workspace,
            manifest,
            store,
            mutator,
        })
    }

    pub fn architecture(&self) -> &Architecture {
        self.store.architecture()
    }

    pub fn policy(&self) -> PersistedPolicy {
        self.store.policy()
    }

    pub fn store_config(&self) -> &StoreConfig {
        self.store.config()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Files extracted from the archive, in archive order.
    pub fn files(&self) -> &[NormalizedPath] {
        self.workspace.files()
    }

    pub fn workspace_dir(&self) -> &Path {
        self.workspace.dir()
    }

    pub fn set_architecture(&mut self, architecture: Architecture) -> Result<()> {
        self.store.set_architecture(architecture)?;
        Ok(())
    }

    /// Set the architecture from user input (`noarch`, blank, or a name).
    pub fn set_architecture_input(&mut self, input: &str) -> Result<()> {
        let architecture = Architecture::from_input(input, self.store.config());
        self.set_architecture(architecture)
    }

    /// Persist a new policy. `Undefined` is rejected and changes nothing.
    pub fn set_policy(&mut self, policy: ResolutionPolicy) -> Result<()> {
        self.store.set_policy(policy)?;
        Ok(())
    }

    /// Fetch `package`, qualified for the current architecture, into the
    /// workspace and register the artifact.
    pub fn fetch_package(
        &mut self,
        package: &str,
        fetcher: &mut dyn PackageFetcher,
    ) -> Result<FetchedPackage> {
        let qualified = self.store.architecture().qualify(package);
        let fetched = fetcher.fetch(&qualified, self.workspace.dir())?;
        self.manifest
            .add_entry(fetched.artifact.clone(), &fetched.media_type);
        tracing::info!(package = %qualified, artifact = %fetched.artifact, "Fetched package");
        Ok(fetched)
    }

    /// Make `script` depend on `package` under the active settings.
    pub fn add_script_dependency(&mut self, script: &str, package: &str) -> Result<DependencyEdge> {
        let edge = self.mutator.add_script_dependency(
            &mut self.manifest,
            self.store.architecture(),
            self.store.policy(),
            script,
            package,
        )?;
        Ok(edge)
    }

    /// Make `source` depend on the already qualified `target`.
    pub fn add_package_dependency(&mut self, source: &str, target: &str) -> Result<DependencyEdge> {
        let edge = self.mutator.add_package_dependency(
            &mut self.manifest,
            self.store.policy(),
            source,
            target,
        )?;
        Ok(edge)
    }

    /// Dependency edges currently in the service template.
    pub fn edges(&mut self) -> Result<Vec<DependencyEdge>> {
        Ok(self.mutator.edges(&self.manifest)?.to_vec())
    }

    /// Settings, files and edges in one value.
    ///
    /// An archive without a service template reports no edges.
    pub fn summary(&mut self) -> Result<ArchiveSummary> {
        let edges = match self.mutator.edges(&self.manifest) {
            Ok(edges) => edges.to_vec(),
            Err(csar_tosca::Error::TemplateNotFound { .. }) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(ArchiveSummary {
            archive: self.workspace.archive().to_path_buf(),
            architecture: self.store.architecture().to_string(),
            policy: self.store.policy(),
            files: self.workspace.files().to_vec(),
            edges,
        })
    }

    /// Compare the manifest with the workspace contents.
    pub fn audit(&self) -> Result<ManifestAudit> {
        Ok(self.manifest.audit(self.workspace.dir())?)
    }

    /// Flush the manifest, then repack the workspace into `target`.
    pub fn pack(&self, target: impl AsRef<Path>) -> Result<()> {
        self.manifest.flush(self.workspace.dir())?;
        self.workspace.close(target)?;
        Ok(())
    }

    /// Remove the working directory.
    pub fn discard(self) -> Result<()> {
        self.workspace.discard()?;
        Ok(())
    }
}

fn load_state(
    dir: &Path,
    config: StoreConfig,
    provider: &mut dyn ValueProvider,
) -> Result<(Manifest, ResolutionStore)> {
    let mut manifest = Manifest::init(dir)?;
    let store = ResolutionStore::init(dir, config, &mut manifest, provider)?;
    Ok((manifest, store))
}
