// ABOUTME: Manifest types and parsing for stackplan.yml.
// ABOUTME: Handles YAML parsing, parameter key resolution and environment overrides.

mod deserialize;
mod init;
mod seed_value;

pub use init::{InitOptions, init_config, render_template};
pub use seed_value::SeedValue;

use crate::error::{Error, Result};
use crate::graph::StackDescriptor;
use crate::pipeline::PipelineConfig;
use crate::store::DEFAULT_STORE_PATH;
use crate::topology::{BlueGreenTopology, TopologyResources};
use crate::types::{ParameterName, StackName};
use deserialize::deserialize_stacks;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "stackplan.yml";
pub const CONFIG_FILENAME_ALT: &str = "stackplan.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".stackplan/config.yml";

pub const DEFAULT_NAMESPACE: &str = "/api";
pub const DEFAULT_REGION: &str = "eu-west-1";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Prefix for parameter keys without an explicit path.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub account: Option<String>,

    /// Parameter keys mapped to explicit store paths.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterName>,

    /// Parameters seeded outside any stack, optionally with a value to seed.
    #[serde(default)]
    pub externals: BTreeMap<String, Option<SeedValue>>,

    #[serde(deserialize_with = "deserialize_stacks")]
    pub stacks: NonEmpty<StackConfig>,

    #[serde(default)]
    pub topology: Option<BlueGreenTopology>,

    #[serde(default)]
    pub resources: TopologyResources,

    #[serde(default)]
    pub pipeline: Option<PipelineConfig>,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub provisioner: Option<ProvisionerConfig>,

    #[serde(default)]
    pub environments: HashMap<String, Environment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    pub name: StackName,
    #[serde(default)]
    pub reads: Vec<String>,
    #[serde(default)]
    pub writes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionerConfig {
    /// Program and arguments run once per stack.
    pub command: Vec<String>,

    #[serde(default = "default_provision_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

/// Named overrides, e.g. a staging account in another region.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Environment {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub externals: BTreeMap<String, Option<SeedValue>>,

    #[serde(default)]
    pub store: Option<StoreConfig>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_provision_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading manifest {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// The default manifest written by `init`.
    pub fn template() -> Result<Self> {
        Self::from_yaml(&render_template(&InitOptions::default()))
    }

    pub fn for_environment(&self, name: &str) -> Result<Config> {
        let env = self
            .environments
            .get(name)
            .ok_or_else(|| Error::UnknownEnvironment(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref region) = env.region {
            merged.region = region.clone();
        }

        if env.account.is_some() {
            merged.account = env.account.clone();
        }

        // Deep merge externals
        for (k, v) in &env.externals {
            merged.externals.insert(k.clone(), v.clone());
        }

        if let Some(ref store) = env.store {
            merged.store = store.clone();
        }

        Ok(merged)
    }

    /// Resolve a parameter key: a literal path, an entry of the `parameters`
    /// table, or `<namespace>/<key>`.
    pub fn parameter_name(&self, key: &str) -> Result<ParameterName> {
        if let Some(name) = self.parameters.get(key) {
            return Ok(name.clone());
        }

        let resolved = if key.starts_with('/') {
            ParameterName::new(key)
        } else {
            ParameterName::in_namespace(&self.namespace, key)
        };

        resolved.map_err(|source| Error::InvalidParameter {
            key: key.to_string(),
            source,
        })
    }

    /// Stack descriptors in declaration order.
    pub fn descriptors(&self) -> Result<Vec<StackDescriptor>> {
        self.stacks
            .iter()
            .map(|stack| -> Result<StackDescriptor> {
                let reads = self.resolve_unique(stack, "reads", &stack.reads)?;
                let writes = self.resolve_unique(stack, "writes", &stack.writes)?;
                Ok(StackDescriptor::new(stack.name.clone())
                    .reads(reads)
                    .writes(writes))
            })
            .collect()
    }

    pub fn external_parameters(&self) -> Result<BTreeSet<ParameterName>> {
        self.externals
            .keys()
            .map(|key| self.parameter_name(key))
            .collect()
    }

    /// External parameters that carry a value, resolved against the process environment.
    pub fn external_seeds(&self) -> Result<Vec<(ParameterName, String)>> {
        self.externals
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key, v)))
            .map(|(key, value)| -> Result<(ParameterName, String)> {
                Ok((self.parameter_name(key)?, value.resolve()?))
            })
            .collect()
    }

    /// Store location, relative paths taken from `project_dir`.
    pub fn store_path(&self, project_dir: &Path) -> PathBuf {
        if self.store.path.is_absolute() {
            self.store.path.clone()
        } else {
            project_dir.join(&self.store.path)
        }
    }

    fn resolve_unique(
        &self,
        stack: &StackConfig,
        field: &str,
        keys: &[String],
    ) -> Result<BTreeSet<ParameterName>> {
        let mut names = BTreeSet::new();
        for key in keys {
            let name = self.parameter_name(key)?;
            if !names.insert(name.clone()) {
                return Err(Error::InvalidConfig(format!(
                    "stack '{}' {} {} more than once",
                    stack.name, field, name
                )));
            }
        }
        Ok(names)
    }
}
