//! Persistence of the architecture and resolution policy settings.
//!
//! Each setting lives as the only line of its own file inside the
//! resolver folder of the workspace. A missing, empty or unreadable file
//! is treated as "never configured" and the value is asked for through
//! the injected [`ValueProvider`].

use std::fs;
use std::path::{Path, PathBuf};

use csar_fs::{NormalizedPath, io};

use crate::config::{Architecture, PersistedPolicy, ResolutionPolicy, StoreConfig};
use crate::manifest::Manifest;
use crate::prompt::{PromptRequest, Slot, ValueProvider};
use crate::{Error, Result};

/// Live architecture and policy of one workspace.
#[derive(Debug, Clone)]
pub struct ResolutionStore {
    root: PathBuf,
    config: StoreConfig,
    architecture: Architecture,
    policy: PersistedPolicy,
}

impl ResolutionStore {
    /// Read both settings, asking `provider` for any that are missing, and
    /// register their files in `manifest`.
    pub fn init(
        workspace: &Path,
        config: StoreConfig,
        manifest: &mut Manifest,
        provider: &mut dyn ValueProvider,
    ) -> Result<Self> {
        let architecture = read_architecture(workspace, &config, provider)?;
        manifest.add_entry(config.architecture_path(), &config.media_type);

        let policy = read_policy(workspace, &config, provider)?;
        manifest.add_entry(config.policy_path(), &config.media_type);

        tracing::info!(%architecture, %policy, "Resolver settings ready");
        Ok(Self {
            root: workspace.to_path_buf(),
            config,
            architecture,
            policy,
        })
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    pub fn policy(&self) -> PersistedPolicy {
        self.policy
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Replace the stored architecture.
    pub fn set_architecture(&mut self, architecture: Architecture) -> Result<()> {
        let path = self.config.architecture_path().under(&self.root);
        replace_value(&path, architecture.as_stored())?;
        tracing::info!(%architecture, "Architecture updated");
        self.architecture = architecture;
        Ok(())
    }

    /// Replace the stored policy.
    ///
    /// `Undefined` is refused with [`Error::InvalidPolicySelection`] and
    /// leaves both the file and the live value untouched.
    pub fn set_policy(&mut self, policy: ResolutionPolicy) -> Result<()> {
        let persisted = match PersistedPolicy::try_from(policy) {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!(%policy, current = %self.policy, "Rejected resolution policy");
                return Err(e);
            }
        };

        let path = self.config.policy_path().under(&self.root);
        replace_value(&path, &persisted.to_string())?;
        tracing::info!(policy = %persisted, "Resolution policy updated");
        self.policy = persisted;
        Ok(())
    }
}

fn read_architecture(
    workspace: &Path,
    config: &StoreConfig,
    provider: &mut dyn ValueProvider,
) -> Result<Architecture> {
    let relative = config.architecture_path();
    let path = relative.under(workspace);

    let line = io::read_first_line(&path)?;
    if let Some(stored) = line.as_deref().filter(|l| !l.is_empty()) {
        tracing::debug!(stored, "Read architecture");
        return Ok(Architecture::from_stored(stored));
    }
    prepare_fallback(workspace, config, &relative, line.is_some())?;

    let answer = ask(
        provider,
        PromptRequest {
            slot: Slot::Architecture,
            message: "Please enter architecture".to_string(),
            hints: vec![format!(
                "Example: {}(default), amd64, arm, {}.",
                config.default_architecture, config.noarch_keyword
            )],
        },
    )?;
    let architecture = Architecture::from_input(&answer, config);
    io::write_text(&path, architecture.as_stored())?;
    Ok(architecture)
}

fn read_policy(
    workspace: &Path,
    config: &StoreConfig,
    provider: &mut dyn ValueProvider,
) -> Result<PersistedPolicy> {
    let relative = config.policy_path();
    let path = relative.under(workspace);

    let line = io::read_first_line(&path)?;
    if let Some(policy) = line
        .as_deref()
        .filter(|l| !l.is_empty())
        .and_then(PersistedPolicy::from_stored)
    {
        tracing::debug!(%policy, "Read resolution policy");
        return Ok(policy);
    }
    prepare_fallback(workspace, config, &relative, line.is_some())?;

    let menu = [PersistedPolicy::Expanding, PersistedPolicy::Addition]
        .into_iter()
        .map(|p| {
            let selection = ResolutionPolicy::from(p).selection().unwrap_or_default();
            let default = if p == PersistedPolicy::default() { " (default)" } else { "" };
            format!("{selection}) {p}{default}")
        })
        .collect();
    let answer = ask(
        provider,
        PromptRequest {
            slot: Slot::Policy,
            message: "Please enter resolution policy".to_string(),
            hints: menu,
        },
    )?;

    let policy = answer
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| PersistedPolicy::try_from(ResolutionPolicy::from_selection(n)).ok())
        .unwrap_or_default();
    io::write_text(&path, &policy.to_string())?;
    Ok(policy)
}

/// Drop a stray unusable file and make sure the resolver folder exists.
fn prepare_fallback(
    workspace: &Path,
    config: &StoreConfig,
    relative: &NormalizedPath,
    stray: bool,
) -> Result<()> {
    if stray {
        let path = relative.under(workspace);
        io::remove_file_if_exists(&path)?;
        tracing::warn!(path = %relative, "Discarded unusable settings file");
    }
    let dir = config.resolver_dir().under(workspace);
    fs::create_dir_all(&dir).map_err(|e| csar_fs::Error::io(&dir, e))?;
    Ok(())
}

fn ask(provider: &mut dyn ValueProvider, request: PromptRequest) -> Result<String> {
    tracing::debug!(slot = %request.slot, "Asking for missing setting");
    provider
        .provide(&request)
        .map_err(|source| Error::PromptFailed {
            slot: request.slot,
            source,
        })
}

/// Delete the old file, then write the new value.
fn replace_value(path: &Path, value: &str) -> Result<()> {
    io::remove_file_if_exists(path)?;
    io::write_text(path, value)?;
    Ok(())
}
