//! Settings commands: set-arch and set-policy

use std::path::Path;

use colored::Colorize;
use csar_meta::ResolutionPolicy;

use super::{Session, invalid_policy, output_path};
use crate::error::Result;

/// Store a new architecture and repack.
pub fn run_set_arch(
    session: &mut Session,
    csar: &Path,
    arch: &str,
    output: Option<&Path>,
) -> Result<()> {
    let target = output_path(csar, output);
    let architecture = session.with_archive(csar, |archive| {
        archive.set_architecture_input(arch)?;
        archive.pack(&target)?;
        Ok(archive.architecture().clone())
    })?;

    println!(
        "{} Architecture set to {}",
        "OK".green().bold(),
        architecture.to_string().cyan()
    );
    Ok(())
}

/// Store a new resolution policy and repack.
pub fn run_set_policy(
    session: &mut Session,
    csar: &Path,
    policy: &str,
    output: Option<&Path>,
) -> Result<()> {
    let requested = ResolutionPolicy::parse(policy);
    if requested == ResolutionPolicy::Undefined {
        return Err(invalid_policy(policy));
    }

    let target = output_path(csar, output);
    let stored = session.with_archive(csar, |archive| {
        archive.set_policy(requested)?;
        archive.pack(&target)?;
        Ok(archive.policy())
    })?;

    println!(
        "{} Resolution policy set to {}",
        "OK".green().bold(),
        stored.to_string().cyan()
    );
    Ok(())
}
