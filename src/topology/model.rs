// ABOUTME: Resource records referenced by a blue/green topology.
// ABOUTME: Listeners, target groups and services as declared in the manifest.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::traffic::TrafficShift;
use crate::types::{ListenerRef, LoadBalancerRef, ServiceRef, TargetGroupRef};

/// How a service hands over to a new task set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentControllerType {
    /// Traffic shifting between target groups is driven by CodeDeploy.
    #[serde(alias = "code_deploy", alias = "code-deploy")]
    CodeDeploy,
    /// Rolling replacement by the container service itself.
    #[serde(alias = "ecs")]
    Ecs,
}

impl fmt::Display for DeploymentControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentControllerType::CodeDeploy => write!(f, "CODE_DEPLOY"),
            DeploymentControllerType::Ecs => write!(f, "ECS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListenerProtocol {
    #[default]
    #[serde(alias = "http")]
    Http,
    #[serde(alias = "https")]
    Https,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerRecord {
    pub name: ListenerRef,
    pub load_balancer: LoadBalancerRef,
    pub port: u16,
    #[serde(default)]
    pub protocol: ListenerProtocol,
    /// Parameter key or ARN of the certificate served on HTTPS listeners.
    #[serde(default)]
    pub certificate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    #[serde(default = "default_health_path")]
    pub path: String,

    #[serde(default = "default_health_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for HealthCheck {
    fn default() -> Self {
        HealthCheck {
            path: default_health_path(),
            interval: default_health_interval(),
        }
    }
}

fn default_health_path() -> String {
    "/".to_string()
}

fn default_health_interval() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetGroupRecord {
    pub name: TargetGroupRef,
    pub load_balancer: LoadBalancerRef,
    #[serde(default)]
    pub protocol: ListenerProtocol,
    /// Services whose task sets register with this group.
    #[serde(default)]
    pub targets: Vec<ServiceRef>,
    #[serde(default)]
    pub health_check: HealthCheck,
}

impl TargetGroupRecord {
    pub fn registers(&self, service: &ServiceRef) -> bool {
        self.targets.contains(service)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityProviderStrategy {
    pub provider: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub base: u32,
}

fn default_weight() -> u32 {
    1
}

impl CapacityProviderStrategy {
    pub fn is_spot(&self) -> bool {
        self.provider.ends_with("_SPOT")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: ServiceRef,
    /// Should hold exactly one entry; more than one is a configuration error.
    #[serde(default = "default_controllers")]
    pub deployment_controllers: Vec<DeploymentControllerType>,
    #[serde(default = "default_capacity_providers")]
    pub capacity_providers: Vec<CapacityProviderStrategy>,
    #[serde(default = "default_desired_count")]
    pub desired_count: u32,
}

fn default_controllers() -> Vec<DeploymentControllerType> {
    vec![DeploymentControllerType::CodeDeploy]
}

fn default_capacity_providers() -> Vec<CapacityProviderStrategy> {
    vec![CapacityProviderStrategy {
        provider: "FARGATE_SPOT".to_string(),
        weight: 1,
        base: 0,
    }]
}

fn default_desired_count() -> u32 {
    1
}

impl ServiceRecord {
    /// Every capacity provider with a positive weight is a spot provider.
    pub fn is_spot_only(&self) -> bool {
        let weighted: Vec<_> = self
            .capacity_providers
            .iter()
            .filter(|s| s.weight > 0)
            .collect();
        !weighted.is_empty() && weighted.iter().all(|s| s.is_spot())
    }
}

/// Records a topology may refer to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyResources {
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    #[serde(default)]
    pub listeners: Vec<ListenerRecord>,
    #[serde(default)]
    pub target_groups: Vec<TargetGroupRecord>,
}

impl TopologyResources {
    pub fn service(&self, name: &ServiceRef) -> Option<&ServiceRecord> {
        self.services.iter().find(|s| &s.name == name)
    }

    pub fn listener(&self, name: &ListenerRef) -> Option<&ListenerRecord> {
        self.listeners.iter().find(|l| &l.name == name)
    }

    pub fn target_group(&self, name: &TargetGroupRef) -> Option<&TargetGroupRecord> {
        self.target_groups.iter().find(|t| &t.name == name)
    }
}

/// The blue/green deployment group: one service behind a production and a
/// test listener, alternating between two target groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueGreenTopology {
    pub service: ServiceRef,
    pub listener: ListenerRef,
    pub test_listener: ListenerRef,
    pub blue_target_group: TargetGroupRef,
    pub green_target_group: TargetGroupRef,
    #[serde(default)]
    pub traffic_shift: TrafficShift,
}
