// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines global flags, all subcommands and their arguments.

use clap::{Parser, Subcommand};
use stackplan::config::{DEFAULT_NAMESPACE, DEFAULT_REGION};
use stackplan::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackplan")]
#[command(about = "Resolve cross-stack parameter dependencies and validate blue/green deployments")]
#[command(version)]
pub struct Cli {
    /// Manifest path (default: discover stackplan.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Named environment from the manifest to apply on top of the defaults
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a stackplan.yml for the certificate, registry, service, DNS and pipeline stacks
    Init {
        /// Prefix for parameter names
        #[arg(long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,

        #[arg(long, default_value = DEFAULT_REGION)]
        region: String,

        /// Overwrite an existing manifest
        #[arg(short, long)]
        force: bool,
    },

    /// Check the dependency graph, topology and pipeline without applying anything
    Validate,

    /// Print the order stacks will be applied in
    Plan,

    /// Apply every stack in dependency order
    Apply {
        /// Print the sequence and check inputs without provisioning
        #[arg(long)]
        dry_run: bool,
    },

    /// Write external parameter values from the manifest into the store
    Seed {
        /// Replace values that are already stored
        #[arg(short, long)]
        force: bool,
    },

    /// Inspect or edit the parameter store
    Params {
        #[command(subcommand)]
        command: ParamsCommand,
    },

    /// Render the task definition and app spec files consumed by the deploy stage
    Artifacts {
        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ParamsCommand {
    /// Print a stored value
    Get {
        /// Full name or key relative to the namespace
        name: String,
    },

    /// Store a value
    Put { name: String, value: String },

    /// List stored parameters
    List,
}
