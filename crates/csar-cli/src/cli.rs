//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// CSAR references resolver - manage package dependencies inside TOSCA archives
#[derive(Parser, Debug)]
#[command(name = "csar-rr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Load resolver settings layout from a TOML or JSON file
    #[arg(long, global = true, value_name = "FILE", env = "CSAR_RR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Answer the architecture prompt (blank = default, "noarch")
    #[arg(long, global = true, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Answer the resolution policy prompt (expanding, addition, 1 or 2)
    #[arg(long, global = true, value_name = "POLICY")]
    pub policy: Option<String>,

    /// Fail instead of prompting for settings missing from the archive
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show settings, files and dependencies of an archive
    Show {
        /// Archive to inspect
        csar: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Make a script depend on a package
    ///
    /// The package name is qualified with the archive's architecture.
    ///
    /// Examples:
    ///   csar-rr add-script app.csar install.sh nginx
    ///   csar-rr add-script app.csar install.sh nginx --packages-dir ./debs
    ///   csar-rr add-script app.csar install.sh nginx -o app2.csar
    AddScript {
        /// Archive to modify
        csar: PathBuf,

        /// Node template id of the script
        script: String,

        /// Package the script needs
        package: String,

        /// Copy the package from this directory into the archive
        #[arg(long, value_name = "DIR")]
        packages_dir: Option<PathBuf>,

        /// Write the result here instead of over the input
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Make a package depend on another, already qualified, package
    AddPackage {
        /// Archive to modify
        csar: PathBuf,

        /// Dependent package
        source: String,

        /// Package depended upon
        target: String,

        /// Write the result here instead of over the input
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Change the target architecture stored in an archive
    ///
    /// Examples:
    ///   csar-rr set-arch app.csar amd64
    ///   csar-rr set-arch app.csar noarch
    SetArch {
        /// Archive to modify
        csar: PathBuf,

        /// Architecture name, or "noarch"
        arch: String,

        /// Write the result here instead of over the input
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Change the resolution policy stored in an archive
    ///
    /// Examples:
    ///   csar-rr set-policy app.csar expanding
    ///   csar-rr set-policy app.csar 2
    SetPolicy {
        /// Archive to modify
        csar: PathBuf,

        /// expanding, addition, 1 or 2
        policy: String,

        /// Write the result here instead of over the input
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Check that the manifest matches the archive contents
    Check {
        /// Archive to check
        csar: PathBuf,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   csar-rr completions bash > ~/.local/share/bash-completion/completions/csar-rr
    ///   csar-rr completions zsh > ~/.zfunc/_csar-rr
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
