// ABOUTME: Renders the task definition and app spec files Deploy consumes.
// ABOUTME: Uses CodeDeploy placeholders for the image and task definition ARN.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::PipelineConfig;
use super::error::PipelineError;

/// Substituted by the deploy action with the image built in this run.
pub const IMAGE_PLACEHOLDER: &str = "<IMAGE1_NAME>";

/// Substituted by the deploy action with the registered task definition ARN.
pub const APP_SPEC_TASK_DEFINITION: &str = "<TASK_DEFINITION>";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinitionDocument {
    pub family: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_role_arn: Option<String>,
    pub network_mode: String,
    pub requires_compatibilities: Vec<String>,
    pub cpu: String,
    pub memory: String,
    pub container_definitions: Vec<ContainerDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition {
    pub name: String,
    pub image: String,
    pub cpu: u32,
    pub memory: u32,
    pub essential: bool,
    pub port_mappings: Vec<PortMapping>,
    pub log_configuration: LogConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u16,
    pub protocol: String,
    pub name: String,
    pub app_protocol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfiguration {
    pub log_driver: String,
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppSpecDocument {
    pub version: String,
    #[serde(rename = "Resources")]
    pub resources: Vec<AppSpecResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppSpecResource {
    pub target_service: TargetService,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetService {
    #[serde(rename = "Type")]
    pub kind: String,
    pub properties: TargetServiceProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetServiceProperties {
    pub task_definition: String,
    pub load_balancer_info: LoadBalancerInfo,
    pub platform_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancerInfo {
    pub container_name: String,
    pub container_port: u16,
}

/// The two files Build emits for Deploy.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildArtifacts {
    pub task_definition: TaskDefinitionDocument,
    pub app_spec: AppSpecDocument,
}

impl BuildArtifacts {
    /// Without a role ARN both role fields are left out of `taskdef.json`.
    pub fn render(pipeline: &PipelineConfig, region: &str, role_arn: Option<&str>) -> Self {
        let container = &pipeline.build.container;

        let mut log_options = BTreeMap::new();
        log_options.insert("awslogs-group".to_string(), container.log_group());
        log_options.insert(
            "awslogs-stream-prefix".to_string(),
            container.stream_prefix.clone(),
        );
        log_options.insert("awslogs-region".to_string(), region.to_string());

        let task_definition = TaskDefinitionDocument {
            family: container.family.clone(),
            execution_role_arn: role_arn.map(str::to_string),
            task_role_arn: role_arn.map(str::to_string),
            network_mode: "awsvpc".to_string(),
            requires_compatibilities: vec!["FARGATE".to_string()],
            cpu: container.cpu.to_string(),
            memory: container.memory.to_string(),
            container_definitions: vec![ContainerDefinition {
                name: container.name.clone(),
                image: IMAGE_PLACEHOLDER.to_string(),
                cpu: container.cpu,
                memory: container.memory,
                essential: true,
                port_mappings: vec![PortMapping {
                    container_port: container.port,
                    protocol: "tcp".to_string(),
                    name: format!("{}-{}-tcp", container.name, container.port),
                    app_protocol: "http".to_string(),
                }],
                log_configuration: LogConfiguration {
                    log_driver: "awslogs".to_string(),
                    options: log_options,
                },
            }],
        };

        let app_spec = AppSpecDocument {
            version: "0.0".to_string(),
            resources: vec![AppSpecResource {
                target_service: TargetService {
                    kind: "AWS::ECS::Service".to_string(),
                    properties: TargetServiceProperties {
                        task_definition: APP_SPEC_TASK_DEFINITION.to_string(),
                        load_balancer_info: LoadBalancerInfo {
                            container_name: container.name.clone(),
                            container_port: container.port,
                        },
                        platform_version: "LATEST".to_string(),
                    },
                },
            }],
        };

        BuildArtifacts {
            task_definition,
            app_spec,
        }
    }

    /// Write both files into `dir` under the names Deploy expects.
    pub fn write(&self, dir: &Path, pipeline: &PipelineConfig) -> Result<Vec<PathBuf>, PipelineError> {
        std::fs::create_dir_all(dir).map_err(|source| PipelineError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let deploy = &pipeline.deploy;
        let files = [
            (
                &deploy.task_definition_template,
                encode(&deploy.task_definition_template, &self.task_definition)?,
            ),
            (
                &deploy.app_spec_template,
                encode(&deploy.app_spec_template, &self.app_spec)?,
            ),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, json) in files {
            let path = dir.join(name);
            std::fs::write(&path, json).map_err(|source| PipelineError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::debug!("wrote artifact {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

fn encode<T: Serialize>(name: &str, document: &T) -> Result<String, PipelineError> {
    serde_json::to_string_pretty(document).map_err(|source| PipelineError::Encode {
        name: name.to_string(),
        source,
    })
}
