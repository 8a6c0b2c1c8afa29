// ABOUTME: Manifest scaffolding for new projects.
// ABOUTME: Writes a stackplan.yml describing the certificate, registry, service, DNS and pipeline stacks.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ParameterName;

use super::{CONFIG_FILENAME, DEFAULT_NAMESPACE, DEFAULT_REGION};

/// Everything after the namespace and region lines of the template.
const TEMPLATE: &str = r#"
# Parameters seeded before the first apply. Give a value (or {env: VAR})
# to have `stackplan seed` write it.
externals:
  certificateDomainName:
  hostedZoneId:
  hostedZoneName:
  aRecordName:

# Apply order is derived from reads/writes, not from this list.
stacks:
  - name: ssl-certificate
    reads: [certificateDomainName, hostedZoneId, hostedZoneName]
    writes: [certificateArn]

  - name: ecr
    writes: [ecrRepositoryArn]

  - name: green-blue-fargate
    reads: [certificateArn, ecrRepositoryArn]
    writes:
      - ecsRoleArn
      - albSecurityGroupId
      - albArn
      - albDnsName
      - albCanonicalHostedZoneId
      - ecsArn
      - taskDefinitionArn
      - fargateServiceArn
      - listenerArn
      - testListenerArn
      - blueTargetGroupArn
      - greenTargetGroupArn

  - name: a-record
    reads:
      - hostedZoneId
      - hostedZoneName
      - albArn
      - albCanonicalHostedZoneId
      - albDnsName
      - albSecurityGroupId
      - aRecordName

  - name: deployment-pipeline
    reads:
      - ecrRepositoryArn
      - ecsRoleArn
      - ecsArn
      - taskDefinitionArn
      - fargateServiceArn
      - listenerArn
      - testListenerArn
      - blueTargetGroupArn
      - greenTargetGroupArn

topology:
  service: api-blue-green-fargate-service
  listener: api-blue-green-prod-listener
  test_listener: api-blue-green-test-listener
  blue_target_group: blue-target-group
  green_target_group: green-target-group
  traffic_shift: LINEAR_10PERCENT_EVERY_1MINUTES

resources:
  services:
    - name: api-blue-green-fargate-service
      deployment_controllers: [CODE_DEPLOY]
      capacity_providers:
        - provider: FARGATE_SPOT
          weight: 1
  listeners:
    - name: api-blue-green-prod-listener
      load_balancer: ecs-fargate-blue-green
      port: 443
      protocol: HTTPS
      certificate: certificateArn
    - name: api-blue-green-test-listener
      load_balancer: ecs-fargate-blue-green
      port: 8080
  target_groups:
    - name: blue-target-group
      load_balancer: ecs-fargate-blue-green
      targets: [api-blue-green-fargate-service]
    - name: green-target-group
      load_balancer: ecs-fargate-blue-green
      targets: [api-blue-green-fargate-service]

pipeline:
  name: ApiDeploymentPipeline
  source:
    owner: my-org
    repository: my-service
    branch: main
    token_secret: GitHubAccessToken
  build:
    artifacts: [taskdef.json, appspec.json]
    container:
      name: api-blue-green-container
      port: 80
      cpu: 256
      memory: 512
      execution_role: ecsRoleArn
  deploy:
    task_definition_template: taskdef.json
    app_spec_template: appspec.json
    deployment_group: ApiBlueGreen

# Run once per stack during `stackplan apply`. The command receives
# STACKPLAN_STACK and STACKPLAN_INPUTS and prints a JSON object of outputs.
# provisioner:
#   command: ["./provision.sh"]
#   timeout: 30m
"#;

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub namespace: String,
    pub region: String,
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        InitOptions {
            namespace: DEFAULT_NAMESPACE.to_string(),
            region: DEFAULT_REGION.to_string(),
            force: false,
        }
    }
}

pub fn render_template(options: &InitOptions) -> String {
    format!(
        "namespace: {}\nregion: {}\n{}",
        options.namespace, options.region, TEMPLATE
    )
}

pub fn init_config(dir: &Path, options: &InitOptions) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !options.force {
        return Err(Error::AlreadyExists(config_path));
    }

    // Reject namespaces that could never prefix a valid parameter name.
    ParameterName::in_namespace(&options.namespace, "placeholder").map_err(|source| {
        Error::InvalidParameter {
            key: options.namespace.clone(),
            source,
        }
    })?;

    if options.region.trim().is_empty() {
        return Err(Error::InvalidConfig("region cannot be empty".to_string()));
    }

    std::fs::write(&config_path, render_template(options))?;
    tracing::info!("wrote {}", config_path.display());

    Ok(())
}
