// ABOUTME: Serial plan executor: reads inputs, provisions, checks and publishes outputs.
// ABOUTME: Stops at the first failing stack and reports which stacks were never attempted.

use serde::Serialize;
use std::collections::BTreeSet;

use super::error::{ApplyError, ApplyFailure};
use super::provisioner::{Outputs, ProvisionRequest, Provisioner};
use crate::graph::{ApplyPlan, DependencyGraph, PlanStep};
use crate::output::Output;
use crate::store::{ParameterStore, StoreError};
use crate::types::{ParameterName, StackName};

/// Deployment target passed to every provisioner call.
#[derive(Debug, Clone)]
pub struct ApplyContext {
    pub region: String,
    pub account: Option<String>,
}

/// A stack that was provisioned and whose outputs were published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedStack {
    pub stack: StackName,
    pub outputs: Vec<ParameterName>,
}

/// Result of a fully successful apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub applied: Vec<AppliedStack>,
}

impl ApplyReport {
    pub fn stacks(&self) -> Vec<&StackName> {
        self.applied.iter().map(|a| &a.stack).collect()
    }
}

/// Applies plan steps one at a time. A stack starts only after the previous
/// one has published all of its outputs.
pub struct Executor<'a> {
    store: &'a dyn ParameterStore,
    provisioner: &'a dyn Provisioner,
    context: ApplyContext,
}

impl<'a> Executor<'a> {
    pub fn new(
        store: &'a dyn ParameterStore,
        provisioner: &'a dyn Provisioner,
        context: ApplyContext,
    ) -> Self {
        Self {
            store,
            provisioner,
            context,
        }
    }

    pub async fn run(&self, plan: &ApplyPlan, output: &Output) -> Result<ApplyReport, ApplyError> {
        let mut report = ApplyReport::default();
        let total = plan.steps.len();

        for (index, step) in plan.steps.iter().enumerate() {
            output.progress(&format!("  → Applying {} ({}/{})", step.stack, index + 1, total));

            match self.apply_step(step).await {
                Ok(outputs) => {
                    tracing::info!("applied {} with {} output(s)", step.stack, outputs.len());
                    report.applied.push(AppliedStack {
                        stack: step.stack.clone(),
                        outputs,
                    });
                }
                Err(cause) => {
                    output.progress(&format!("  ✗ {} failed", step.stack));
                    return Err(ApplyError {
                        stack: step.stack.clone(),
                        cause,
                        applied: report.applied.into_iter().map(|a| a.stack).collect(),
                        remaining: plan.steps[index + 1..]
                            .iter()
                            .map(|s| s.stack.clone())
                            .collect(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn apply_step(&self, step: &PlanStep) -> Result<Vec<ParameterName>, ApplyFailure> {
        let mut inputs = Outputs::new();
        for read in &step.reads {
            let value = self.store.get(read).map_err(ApplyFailure::Input)?;
            inputs.insert(read.clone(), value);
        }

        let request = ProvisionRequest {
            step,
            inputs: &inputs,
            region: &self.context.region,
            account: self.context.account.as_deref(),
        };
        let outputs = self.provisioner.provision(request).await?;

        if let Some(extra) = outputs.keys().find(|name| !step.writes.contains(*name)) {
            return Err(ApplyFailure::UndeclaredOutput(extra.clone()));
        }
        if let Some(missing) = step.writes.iter().find(|name| !outputs.contains_key(*name)) {
            return Err(ApplyFailure::MissingOutput(missing.clone()));
        }

        let mut published = Vec::with_capacity(outputs.len());
        for (name, value) in outputs {
            if let Err(source) = self.store.put(&name, &value) {
                return Err(ApplyFailure::Publish {
                    output: name,
                    source,
                    published,
                });
            }
            tracing::debug!("published {}", name);
            published.push(name);
        }

        Ok(published)
    }
}

/// External parameters some stack reads that the store does not hold yet.
pub fn missing_externals(
    graph: &DependencyGraph,
    store: &dyn ParameterStore,
) -> Result<Vec<ParameterName>, StoreError> {
    let wanted: BTreeSet<&ParameterName> = graph
        .stacks()
        .iter()
        .flat_map(|stack| stack.reads.iter())
        .filter(|read| graph.is_external(read))
        .collect();

    let mut missing = Vec::new();
    for name in wanted {
        if !store.contains(name)? {
            missing.push(name.clone());
        }
    }
    Ok(missing)
}
