// ABOUTME: Provisioner seam between the plan and the cloud provisioning engine.
// ABOUTME: CommandProvisioner runs an external program per stack and reads its outputs as JSON.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::error::ProvisionError;
use crate::config::ProvisionerConfig;
use crate::graph::PlanStep;
use crate::types::ParameterName;

/// Values a stack published, keyed by parameter name.
pub type Outputs = BTreeMap<ParameterName, String>;

/// Everything a provisioner needs to create or update one stack.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionRequest<'a> {
    pub step: &'a PlanStep,
    /// Values of every parameter the stack reads.
    pub inputs: &'a Outputs,
    pub region: &'a str,
    pub account: Option<&'a str>,
}

/// Creates or updates the resources of one stack and reports its outputs.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn provision(&self, request: ProvisionRequest<'_>) -> Result<Outputs, ProvisionError>;
}

/// Runs a configured program once per stack.
///
/// The program receives `STACKPLAN_STACK`, `STACKPLAN_REGION`,
/// `STACKPLAN_ACCOUNT` (when set), `STACKPLAN_WRITES` (comma separated) and
/// `STACKPLAN_INPUTS` (a JSON object) in its environment and must print a JSON
/// object mapping output names to string values. Keys may be full parameter
/// names or just their last segment.
#[derive(Debug, Clone)]
pub struct CommandProvisioner {
    command: Vec<String>,
    timeout: Duration,
    working_dir: Option<PathBuf>,
}

impl CommandProvisioner {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self {
            command,
            timeout,
            working_dir: None,
        }
    }

    pub fn from_config(config: &ProvisionerConfig) -> Self {
        Self::new(config.command.clone(), config.timeout)
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn environment(request: &ProvisionRequest<'_>) -> Result<Vec<(String, String)>, ProvisionError> {
        let inputs: BTreeMap<&str, &str> = request
            .inputs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let inputs_json = serde_json::to_string(&inputs)
            .map_err(|e| ProvisionError::InvalidOutput(e.to_string()))?;
        let writes: Vec<&str> = request.step.writes.iter().map(ParameterName::as_str).collect();

        let mut env = vec![
            ("STACKPLAN_STACK".to_string(), request.step.stack.to_string()),
            ("STACKPLAN_REGION".to_string(), request.region.to_string()),
            ("STACKPLAN_WRITES".to_string(), writes.join(",")),
            ("STACKPLAN_INPUTS".to_string(), inputs_json),
        ];
        if let Some(account) = request.account {
            env.push(("STACKPLAN_ACCOUNT".to_string(), account.to_string()));
        }
        Ok(env)
    }
}

#[async_trait]
impl Provisioner for CommandProvisioner {
    async fn provision(&self, request: ProvisionRequest<'_>) -> Result<Outputs, ProvisionError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or(ProvisionError::EmptyCommand)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .envs(Self::environment(&request)?)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.working_dir {
            command.current_dir(dir);
        }

        tracing::info!("provisioning {} with {}", request.step.stack, program);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ProvisionError::Timeout(self.timeout))?
            .map_err(ProvisionError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(
                "provisioner failed for {} with exit code {:?}",
                request.step.stack,
                output.status.code()
            );
            return Err(ProvisionError::Failed {
                code: output.status.code(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_outputs(&stdout, request.step)
    }
}

/// Parse `{"albArn": "...", "/api/albDnsName": "..."}` into parameter names.
///
/// Every key must resolve to exactly one parameter, and no two keys may
/// resolve to the same one.
fn parse_outputs(stdout: &str, step: &PlanStep) -> Result<Outputs, ProvisionError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Outputs::new());
    }

    let raw: BTreeMap<String, String> =
        serde_json::from_str(trimmed).map_err(|e| ProvisionError::InvalidOutput(e.to_string()))?;

    let mut outputs = Outputs::new();
    for (key, value) in raw {
        let name = resolve_key(&key, step)?;
        if outputs.contains_key(&name) {
            return Err(ProvisionError::InvalidOutput(format!(
                "output '{key}' repeats {name}, which another key already set"
            )));
        }
        outputs.insert(name, value);
    }
    Ok(outputs)
}

fn resolve_key(key: &str, step: &PlanStep) -> Result<ParameterName, ProvisionError> {
    if key.starts_with('/') {
        return ParameterName::new(key).map_err(|e| ProvisionError::InvalidOutput(e.to_string()));
    }

    let mut matches = step.writes.iter().filter(|w| w.leaf() == key);
    match (matches.next(), matches.next()) {
        (Some(write), None) => Ok(write.clone()),
        (Some(first), Some(second)) => Err(ProvisionError::InvalidOutput(format!(
            "output '{key}' is ambiguous for {}: matches {first} and {second}",
            step.stack
        ))),
        (None, _) => Err(ProvisionError::InvalidOutput(format!(
            "output '{key}' does not match any declared write of {}",
            step.stack
        ))),
    }
}
