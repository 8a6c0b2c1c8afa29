// ABOUTME: Entry point for the stackplan CLI application.
// ABOUTME: Parses arguments, sets up tracing and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, ParamsCommand};
use commands::Project;
use stackplan::config::InitOptions;
use stackplan::error::Result;
use stackplan::output::Output;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new(cli.output_mode());

    if let Err(e) = run(cli, output.clone()).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    let config_path = cli.config.as_deref();
    let environment = cli.env.as_deref();

    match cli.command {
        Commands::Init {
            namespace,
            region,
            force,
        } => {
            let cwd = env::current_dir()?;
            let options = InitOptions {
                namespace,
                region,
                force,
            };
            commands::init(&cwd, &options, &output)
        }
        Commands::Validate => {
            let project = Project::load(config_path, environment)?;
            commands::validate(&project, &output)
        }
        Commands::Plan => {
            let project = Project::load(config_path, environment)?;
            commands::plan(&project, &output)
        }
        Commands::Apply { dry_run } => {
            let project = Project::load(config_path, environment)?;
            commands::apply(&project, dry_run, output).await
        }
        Commands::Seed { force } => {
            let project = Project::load(config_path, environment)?;
            commands::seed(&project, force, &output)
        }
        Commands::Params { command } => {
            let project = Project::load(config_path, environment)?;
            match command {
                ParamsCommand::Get { name } => commands::params_get(&project, &name, &output),
                ParamsCommand::Put { name, value } => {
                    commands::params_put(&project, &name, &value, &output)
                }
                ParamsCommand::List => commands::params_list(&project, &output),
            }
        }
        Commands::Artifacts { out } => {
            let project = Project::load(config_path, environment)?;
            commands::artifacts(&project, &out, &output)
        }
    }
}
