// ABOUTME: Pipeline consistency checks.
// ABOUTME: Build must emit exactly two distinct files and Deploy must consume both of them.

use std::collections::HashSet;

use super::PipelineConfig;
use super::error::PipelineError;

/// Number of artifact files Build hands to Deploy.
const EXPECTED_ARTIFACTS: usize = 2;

pub fn validate_pipeline(pipeline: &PipelineConfig) -> Result<(), PipelineError> {
    let source = &pipeline.source;
    for (field, value) in [
        ("owner", &source.owner),
        ("repository", &source.repository),
        ("branch", &source.branch),
    ] {
        if value.trim().is_empty() {
            return Err(PipelineError::invalid(format!("source {field} cannot be empty")));
        }
    }

    let artifacts = &pipeline.build.artifacts;
    if artifacts.len() != EXPECTED_ARTIFACTS {
        return Err(PipelineError::invalid(format!(
            "build must emit exactly {EXPECTED_ARTIFACTS} artifact files, found {}",
            artifacts.len()
        )));
    }

    let mut seen = HashSet::new();
    for artifact in artifacts {
        if artifact.trim().is_empty() {
            return Err(PipelineError::invalid("artifact file name cannot be empty"));
        }
        if !seen.insert(artifact.as_str()) {
            return Err(PipelineError::invalid(format!(
                "artifact '{artifact}' is emitted twice"
            )));
        }
    }

    let deploy = &pipeline.deploy;
    if deploy.task_definition_template == deploy.app_spec_template {
        return Err(PipelineError::invalid(format!(
            "task definition and app spec templates are both '{}'",
            deploy.task_definition_template
        )));
    }
    for template in [&deploy.task_definition_template, &deploy.app_spec_template] {
        if !seen.contains(template.as_str()) {
            return Err(PipelineError::invalid(format!(
                "deploy consumes '{template}' which build does not emit"
            )));
        }
    }

    let container = &pipeline.build.container;
    if container.port == 0 {
        return Err(PipelineError::invalid("container port cannot be 0"));
    }
    if !fargate_memory_valid(container.cpu, container.memory) {
        return Err(PipelineError::invalid(format!(
            "{} MiB memory is not available with {} CPU units on Fargate",
            container.memory, container.cpu
        )));
    }

    Ok(())
}

/// Whether Fargate offers `memory` MiB alongside `cpu` units.
pub fn fargate_memory_valid(cpu: u32, memory: u32) -> bool {
    match cpu {
        256 => matches!(memory, 512 | 1024 | 2048),
        512 => (1024..=4096).contains(&memory) && memory % 1024 == 0,
        1024 => (2048..=8192).contains(&memory) && memory % 1024 == 0,
        2048 => (4096..=16384).contains(&memory) && memory % 1024 == 0,
        4096 => (8192..=30720).contains(&memory) && memory % 1024 == 0,
        _ => false,
    }
}
