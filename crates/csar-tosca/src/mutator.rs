//! Policy-driven edits of the dependency graph.

use std::path::PathBuf;

use csar_fs::NormalizedPath;
use csar_meta::{Architecture, DEFINITIONS_MEDIA_TYPE, Manifest, PersistedPolicy};

use crate::template::{self, DependencyEdge, ServiceTemplate};
use crate::{RR_NAMESPACE, Result, descriptor};

/// Adds `RR_DependsOn` edges to the service template of one workspace.
///
/// The template is located and parsed on first use and kept in memory;
/// every mutation is saved back immediately.
#[derive(Debug)]
pub struct DependencyMutator {
    workspace: PathBuf,
    template: Option<ServiceTemplate>,
    prepared: bool,
}

impl DependencyMutator {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            template: None,
            prepared: false,
        }
    }

    /// Current dependency edges of the template.
    pub fn edges(&mut self, manifest: &Manifest) -> Result<&[DependencyEdge]> {
        Ok(self.template_mut(manifest)?.edges())
    }

    /// Make `script` depend on `package`, qualified for `architecture`.
    pub fn add_script_dependency(
        &mut self,
        manifest: &mut Manifest,
        architecture: &Architecture,
        policy: PersistedPolicy,
        script: &str,
        package: &str,
    ) -> Result<DependencyEdge> {
        let target = architecture.qualify(package);
        self.merge(manifest, policy, script, &target)
    }

    /// Make `source` depend on `target`, taken as already qualified.
    pub fn add_package_dependency(
        &mut self,
        manifest: &mut Manifest,
        policy: PersistedPolicy,
        source: &str,
        target: &str,
    ) -> Result<DependencyEdge> {
        self.merge(manifest, policy, source, target)
    }

    fn merge(
        &mut self,
        manifest: &mut Manifest,
        policy: PersistedPolicy,
        source: &str,
        target: &str,
    ) -> Result<DependencyEdge> {
        self.prepare(manifest)?;
        let template = self.template_mut(manifest)?;

        let edge = match policy {
            PersistedPolicy::Addition => template.append_edge(source, target)?,
            PersistedPolicy::Expanding => match template.retarget(source, target)? {
                Some(edge) => edge,
                None => template.append_edge(source, target)?,
            },
        };
        template.save()?;

        tracing::info!(%policy, id = %edge.id, source, target, "Added dependency");
        Ok(edge)
    }

    /// Write the descriptor, import it and register the template, once.
    fn prepare(&mut self, manifest: &mut Manifest) -> Result<()> {
        if self.prepared {
            return Ok(());
        }
        let workspace = self.workspace.clone();
        let template = self.template_mut(manifest)?;
        descriptor::ensure(&workspace, manifest)?;

        let relative = NormalizedPath::relative_to(template.path(), &workspace)?;
        let location = relative_location(relative.parent().as_ref(), &descriptor::descriptor_path());
        if template.ensure_import(RR_NAMESPACE, &location)? {
            template.save()?;
        }
        if !manifest.contains(&relative) {
            manifest.add_entry(relative, DEFINITIONS_MEDIA_TYPE);
        }

        self.prepared = true;
        Ok(())
    }

    fn template_mut(&mut self, manifest: &Manifest) -> Result<&mut ServiceTemplate> {
        let template = match self.template.take() {
            Some(template) => template,
            None => ServiceTemplate::load(&template::locate(&self.workspace, manifest)?)?,
        };
        Ok(self.template.insert(template))
    }
}

/// Path of `to` as seen from the directory `from_dir`, both archive-relative.
fn relative_location(from_dir: Option<&NormalizedPath>, to: &NormalizedPath) -> String {
    let from: Vec<&str> = from_dir
        .map(|dir| dir.as_str().split('/').collect())
        .unwrap_or_default();
    let to: Vec<&str> = to.as_str().split('/').collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts = vec![".."; from.len() - common];
    parts.extend(&to[common..]);
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_next_to_template() {
        let dir = NormalizedPath::new("Definitions");
        let to = NormalizedPath::new("Definitions/RR_DependsOn.tosca");
        assert_eq!(relative_location(Some(&dir), &to), "RR_DependsOn.tosca");
    }

    #[test]
    fn location_from_other_folder() {
        let dir = NormalizedPath::new("Service/Templates");
        let to = NormalizedPath::new("Definitions/RR_DependsOn.tosca");
        assert_eq!(relative_location(Some(&dir), &to), "../../Definitions/RR_DependsOn.tosca");
        assert_eq!(relative_location(None, &to), "Definitions/RR_DependsOn.tosca");
    }
}
