//! CSAR references resolver CLI
//!
//! Adds package dependencies to the service template of a TOSCA archive
//! and keeps the archive's resolver settings.

mod cli;
mod commands;
mod error;
mod logging;
mod prompt;

use std::io;

use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::{Cli, Commands};
use commands::Session;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }
    tracing::info!("Verbose mode enabled");

    let mut session = Session::from_cli(&cli)?;
    match cli.command {
        Some(cmd) => execute_command(&mut session, cmd),
        None => {
            // No command provided - show help hint
            println!("{} CSAR references resolver", "csar-rr".green().bold());
            println!();
            println!("Run {} for available commands.", "csar-rr --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(session: &mut Session, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Show { csar, json } => commands::run_show(session, &csar, json),
        Commands::AddScript {
            csar,
            script,
            package,
            packages_dir,
            output,
        } => commands::run_add_script(
            session,
            &csar,
            &script,
            &package,
            packages_dir.as_deref(),
            output.as_deref(),
        ),
        Commands::AddPackage {
            csar,
            source,
            target,
            output,
        } => commands::run_add_package(session, &csar, &source, &target, output.as_deref()),
        Commands::SetArch { csar, arch, output } => {
            commands::run_set_arch(session, &csar, &arch, output.as_deref())
        }
        Commands::SetPolicy {
            csar,
            policy,
            output,
        } => commands::run_set_policy(session, &csar, &policy, output.as_deref()),
        Commands::Check { csar } => commands::run_check(session, &csar),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "csar-rr", &mut io::stdout());
            Ok(())
        }
    }
}
