// ABOUTME: Source/Build/Deploy pipeline model for blue/green releases.
// ABOUTME: Validates the build-to-deploy artifact hand-off and renders the two artifact files.

mod artifacts;
mod error;
mod validate;

pub use artifacts::{
    APP_SPEC_TASK_DEFINITION, AppSpecDocument, BuildArtifacts, IMAGE_PLACEHOLDER,
    TaskDefinitionDocument,
};
pub use error::PipelineError;
pub use validate::{fargate_memory_valid, validate_pipeline};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_pipeline_name")]
    pub name: String,
    pub source: SourceStage,
    #[serde(default)]
    pub build: BuildStage,
    #[serde(default)]
    pub deploy: DeployStage,
}

fn default_pipeline_name() -> String {
    "ApiDeploymentPipeline".to_string()
}

/// Where the application source is fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStage {
    pub owner: String,
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Name of the secret holding the source access token.
    #[serde(default)]
    pub token_secret: Option<String>,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Builds the image and emits the artifact files Deploy consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStage {
    #[serde(default = "default_artifacts")]
    pub artifacts: Vec<String>,
    #[serde(default)]
    pub container: ContainerSpec,
}

impl Default for BuildStage {
    fn default() -> Self {
        BuildStage {
            artifacts: default_artifacts(),
            container: ContainerSpec::default(),
        }
    }
}

fn default_artifacts() -> Vec<String> {
    vec![default_task_definition(), default_app_spec()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSpec {
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(default = "default_container_name")]
    pub name: String,
    #[serde(default = "default_container_port")]
    pub port: u16,
    #[serde(default = "default_cpu")]
    pub cpu: u32,
    #[serde(default = "default_memory")]
    pub memory: u32,
    #[serde(default)]
    pub log_group: Option<String>,
    #[serde(default = "default_stream_prefix")]
    pub stream_prefix: String,
    /// Parameter key holding the task execution role ARN.
    #[serde(default)]
    pub execution_role: Option<String>,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        ContainerSpec {
            family: default_family(),
            name: default_container_name(),
            port: default_container_port(),
            cpu: default_cpu(),
            memory: default_memory(),
            log_group: None,
            stream_prefix: default_stream_prefix(),
            execution_role: None,
        }
    }
}

impl ContainerSpec {
    pub fn log_group(&self) -> String {
        self.log_group
            .clone()
            .unwrap_or_else(|| format!("/ecs/{}", self.family))
    }
}

fn default_family() -> String {
    "api-blue-green-fargate-task-definition".to_string()
}

fn default_container_name() -> String {
    "api-blue-green-container".to_string()
}

fn default_container_port() -> u16 {
    80
}

fn default_cpu() -> u32 {
    256
}

fn default_memory() -> u32 {
    512
}

fn default_stream_prefix() -> String {
    "ApiDeployBlueGreenLogStream".to_string()
}

/// Consumes the build artifacts verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployStage {
    #[serde(default = "default_task_definition")]
    pub task_definition_template: String,
    #[serde(default = "default_app_spec")]
    pub app_spec_template: String,
    #[serde(default = "default_deployment_group")]
    pub deployment_group: String,
}

impl Default for DeployStage {
    fn default() -> Self {
        DeployStage {
            task_definition_template: default_task_definition(),
            app_spec_template: default_app_spec(),
            deployment_group: default_deployment_group(),
        }
    }
}

fn default_task_definition() -> String {
    "taskdef.json".to_string()
}

fn default_app_spec() -> String {
    "appspec.json".to_string()
}

fn default_deployment_group() -> String {
    "ApiBlueGreen".to_string()
}
