//! The check command

use std::path::Path;

use colored::Colorize;

use super::Session;
use crate::error::{CliError, Result};

/// Audit the manifest of `csar`; fails when anything is out of place.
pub fn run_check(session: &mut Session, csar: &Path) -> Result<()> {
    let audit = session.with_archive(csar, |archive| Ok(archive.audit()?))?;

    if audit.is_clean() {
        println!("{} Manifest matches archive contents.", "OK".green().bold());
        return Ok(());
    }

    for path in &audit.missing {
        println!("{} {} listed but missing", "MISSING".red().bold(), path);
    }
    for path in &audit.unregistered {
        println!("{} {} not listed in manifest", "UNLISTED".yellow().bold(), path);
    }
    Err(CliError::user(format!(
        "{} manifest problem(s) found",
        audit.missing.len() + audit.unregistered.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::session;
    use csar_test_utils::TestCsar;

    #[test]
    fn sample_archive_is_clean() {
        let (_dir, csar) = TestCsar::sample().write_temp("app.csar");
        run_check(&mut session(), &csar).unwrap();
    }

    #[test]
    fn unlisted_file_fails() {
        let (_dir, csar) = TestCsar::sample()
            .with_file("Scripts/extra.sh", "echo")
            .write_temp("app.csar");

        let err = run_check(&mut session(), &csar).unwrap_err();

        assert_eq!(err.to_string(), "1 manifest problem(s) found");
    }
}
