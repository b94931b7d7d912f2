//! Command implementations for csar-cli

pub mod check;
pub mod dependency;
pub mod settings;
pub mod show;

pub use check::run_check;
pub use dependency::{run_add_package, run_add_script};
pub use settings::{run_set_arch, run_set_policy};
pub use show::run_show;

use std::path::{Path, PathBuf};

use csar_core::{Archive, ArchiveOptions};
use csar_fs::ConfigStore;
use csar_meta::{ResolutionPolicy, StoreConfig};

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::prompt::ConsolePrompt;

/// Settings shared by every command: store layout and prompt answers.
#[derive(Debug, Clone)]
pub struct Session {
    options: ArchiveOptions,
    prompt: ConsolePrompt,
}

impl Session {
    pub fn new(store: StoreConfig, prompt: ConsolePrompt) -> Self {
        Self {
            options: ArchiveOptions {
                workspace_dir: None,
                store,
            },
            prompt,
        }
    }

    /// Build from global flags, loading `--config` if given.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let store = match &cli.config {
            Some(path) => ConfigStore::new().load::<StoreConfig>(path)?,
            None => StoreConfig::default(),
        };
        let policy = cli.policy.as_deref().map(policy_answer).transpose()?;
        let prompt = ConsolePrompt::new(cli.arch.clone(), policy, !cli.non_interactive);
        Ok(Self::new(store, prompt))
    }

    /// Open `csar`, run `f`, and remove the workspace whatever the outcome.
    pub fn with_archive<T>(
        &mut self,
        csar: &Path,
        f: impl FnOnce(&mut Archive) -> Result<T>,
    ) -> Result<T> {
        let mut archive = Archive::open_with(csar, self.options.clone(), &mut self.prompt)?;
        let result = f(&mut archive);
        let discarded = archive.discard();
        let value = result?;
        discarded?;
        Ok(value)
    }
}

/// Turn a `--policy` value into the menu selection the prompt expects.
fn policy_answer(input: &str) -> Result<String> {
    ResolutionPolicy::parse(input)
        .selection()
        .map(|n| n.to_string())
        .ok_or_else(|| invalid_policy(input))
}

fn invalid_policy(input: &str) -> CliError {
    CliError::user(format!(
        "Unknown resolution policy '{input}' (expected expanding, addition, 1 or 2)"
    ))
}

/// Where a modified archive is written.
fn output_path(csar: &Path, output: Option<&Path>) -> PathBuf {
    output.unwrap_or(csar).to_path_buf()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use csar_test_utils::TestCsar;
    use tempfile::TempDir;

    /// A session that never prompts and answers every setting with its default.
    pub fn session() -> Session {
        Session::new(
            StoreConfig::default(),
            ConsolePrompt::new(Some(String::new()), Some(String::new()), false),
        )
    }

    pub fn sample() -> (TempDir, PathBuf) {
        TestCsar::sample().write_temp("app.csar")
    }
}
