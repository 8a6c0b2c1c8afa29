// ABOUTME: Command module aggregator for the stackplan CLI.
// ABOUTME: Loads the project manifest and runs the shared graph, topology and pipeline checks.

mod apply;
mod artifacts;
mod init;
mod params;
mod seed;
mod validate;

pub use apply::apply;
pub use artifacts::artifacts;
pub use init::init;
pub use params::{params_get, params_list, params_put};
pub use seed::seed;
pub use validate::{plan, validate};

use stackplan::config::Config;
use stackplan::diagnostics::{Diagnostics, Warning};
use stackplan::error::Result;
use stackplan::graph::DependencyGraph;
use stackplan::output::Output;
use stackplan::pipeline::validate_pipeline;
use stackplan::store::FileStore;
use stackplan::topology::validate_topology;
use std::env;
use std::path::{Path, PathBuf};

/// A loaded manifest and the directory relative paths resolve against.
pub struct Project {
    pub config: Config,
    pub dir: PathBuf,
}

impl Project {
    pub fn load(config_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let cwd = env::current_dir()?;
        let (config, dir) = match config_path {
            Some(path) => {
                let dir = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => cwd,
                };
                (Config::load(path)?, dir)
            }
            None => (Config::discover(&cwd)?, cwd),
        };

        let config = match environment {
            Some(name) => config.for_environment(name)?,
            None => config,
        };

        Ok(Project { config, dir })
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(self.config.store_path(&self.dir))
    }
}

/// Result of the checks every command that plans runs first.
pub(crate) struct Checked {
    pub graph: DependencyGraph,
    pub diagnostics: Diagnostics,
    /// One-line description of the validated blue/green setup, if declared.
    pub topology: Option<String>,
}

/// Build the graph and validate topology and pipeline, collecting warnings.
pub(crate) fn check(config: &Config) -> Result<Checked> {
    let mut diagnostics = Diagnostics::default();

    let descriptors = config.descriptors()?;
    let externals = config.external_parameters()?;
    let graph = DependencyGraph::build_with_externals(&descriptors, &externals)?;

    for (stack, parameter) in graph.unconsumed_writes() {
        diagnostics.warn(Warning::unconsumed_output(stack, parameter));
    }
    for parameter in graph.unused_externals() {
        diagnostics.warn(Warning::unused_external(parameter));
    }

    let topology = match config.topology {
        Some(ref topology) => {
            let validated = validate_topology(topology, &config.resources)?;
            diagnostics.extend(validated.warnings());
            Some(format!(
                "{} behind {} ({} -> {}), {}",
                validated.service.name,
                validated.load_balancer(),
                validated.blue_target_group.name,
                validated.green_target_group.name,
                validated.traffic_shift
            ))
        }
        None => None,
    };

    if let Some(ref pipeline) = config.pipeline {
        validate_pipeline(pipeline)?;
    }

    Ok(Checked {
        graph,
        diagnostics,
        topology,
    })
}

pub(crate) fn print_warnings(diagnostics: &Diagnostics, output: &Output) {
    for warning in diagnostics.warnings() {
        output.warning(warning);
    }
}
