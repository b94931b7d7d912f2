//! Dependency commands: add-script and add-package

use std::path::Path;

use colored::Colorize;
use csar_core::DirectoryFetcher;

use super::{Session, output_path};
use crate::error::Result;

/// Make `script` depend on `package`, optionally copying the package in
/// from `packages_dir`, and repack.
pub fn run_add_script(
    session: &mut Session,
    csar: &Path,
    script: &str,
    package: &str,
    packages_dir: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let target = output_path(csar, output);
    println!(
        "{} Adding dependency: {} -> {}",
        "=>".blue().bold(),
        script.cyan(),
        package.cyan()
    );

    let edge = session.with_archive(csar, |archive| {
        if let Some(dir) = packages_dir {
            let fetched = archive.fetch_package(package, &mut DirectoryFetcher::new(dir))?;
            println!(
                "{} Packaged {}",
                "OK".green().bold(),
                fetched.artifact.to_string().cyan()
            );
        }
        let edge = archive.add_script_dependency(script, package)?;
        archive.pack(&target)?;
        Ok(edge)
    })?;

    println!(
        "{} {} -> {} written to {}",
        "OK".green().bold(),
        edge.source.cyan(),
        edge.target.cyan(),
        target.display()
    );
    Ok(())
}

/// Make `source` depend on `target_package` and repack.
pub fn run_add_package(
    session: &mut Session,
    csar: &Path,
    source: &str,
    target_package: &str,
    output: Option<&Path>,
) -> Result<()> {
    let target = output_path(csar, output);
    println!(
        "{} Adding dependency: {} -> {}",
        "=>".blue().bold(),
        source.cyan(),
        target_package.cyan()
    );

    let edge = session.with_archive(csar, |archive| {
        let edge = archive.add_package_dependency(source, target_package)?;
        archive.pack(&target)?;
        Ok(edge)
    })?;

    println!(
        "{} {} -> {} written to {}",
        "OK".green().bold(),
        edge.source.cyan(),
        edge.target.cyan(),
        target.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{sample, session};
    use csar_test_utils::read_entry;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn add_script_rewrites_input_by_default() {
        let (_dir, csar) = sample();

        run_add_script(&mut session(), &csar, "install.sh", "nginx", None, None).unwrap();

        let template = read_entry(&csar, "Definitions/app.tosca").unwrap();
        assert!(template.contains("<TargetElement ref=\"nginx\"/>"));
    }

    #[test]
    fn add_script_with_packages_dir() {
        let (dir, csar) = sample();
        let debs = TempDir::new().unwrap();
        fs::write(debs.path().join("nginx.deb"), "deb").unwrap();
        let out = dir.path().join("out.csar");

        run_add_script(&mut session(), &csar, "install.sh", "nginx", Some(debs.path()), Some(&out))
            .unwrap();

        assert!(read_entry(&out, "Content/Packages/nginx.deb").is_some());
        assert!(read_entry(&csar, "Content/Packages/nginx.deb").is_none());
    }

    #[test]
    fn add_package_writes_output() {
        let (dir, csar) = sample();
        let out = dir.path().join("out.csar");

        run_add_package(&mut session(), &csar, "nginx", "libc6", Some(&out)).unwrap();

        let template = read_entry(&out, "Definitions/app.tosca").unwrap();
        assert!(template.contains("<SourceElement ref=\"nginx\"/>"));
    }
}
