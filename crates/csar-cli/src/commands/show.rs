//! The show command

use std::path::Path;

use colored::Colorize;

use super::Session;
use crate::error::Result;

/// Print architecture, policy, files and dependency edges of `csar`.
pub fn run_show(session: &mut Session, csar: &Path, json: bool) -> Result<()> {
    let summary = session.with_archive(csar, |archive| Ok(archive.summary()?))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} {}", "=>".blue().bold(), csar.display().to_string().cyan());
    println!("   Architecture: {}", summary.architecture.bold());
    println!("   Policy:       {}", summary.policy.to_string().bold());

    println!("   Files ({}):", summary.files.len());
    for file in &summary.files {
        println!("     {file}");
    }

    println!("   Dependencies ({}):", summary.edges.len());
    if summary.edges.is_empty() {
        println!("     {}", "none".dimmed());
    }
    for edge in &summary.edges {
        println!(
            "     {} -> {}  {}",
            edge.source.cyan(),
            edge.target.cyan(),
            format!("({})", edge.id).dimmed()
        );
    }
    Ok(())
}
