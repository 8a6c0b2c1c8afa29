// ABOUTME: Validate and plan command implementations.
// ABOUTME: Both run the full check; plan also prints the apply sequence.

use serde::Serialize;
use stackplan::diagnostics::Warning;
use stackplan::error::Result;
use stackplan::graph::ApplyPlan;
use stackplan::output::{Output, OutputMode};

use super::{Project, check, print_warnings};

#[derive(Serialize)]
struct ValidationSummary<'a> {
    stacks: usize,
    edges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    topology: Option<&'a str>,
    warnings: &'a [Warning],
}

pub fn validate(project: &Project, output: &Output) -> Result<()> {
    let checked = check(&project.config)?;

    if output.mode() == OutputMode::Json {
        output.json(&ValidationSummary {
            stacks: checked.graph.len(),
            edges: checked.graph.edges().len(),
            topology: checked.topology.as_deref(),
            warnings: checked.diagnostics.warnings(),
        });
        return Ok(());
    }

    print_warnings(&checked.diagnostics, output);
    if let Some(ref topology) = checked.topology {
        output.progress(&format!("Topology: {topology}"));
    }
    output.success(&format!(
        "Manifest is valid: {} stack(s), {} dependency edge(s)",
        checked.graph.len(),
        checked.graph.edges().len()
    ));
    Ok(())
}

pub fn plan(project: &Project, output: &Output) -> Result<()> {
    let checked = check(&project.config)?;
    print_warnings(&checked.diagnostics, output);

    let plan = ApplyPlan::emit(&checked.graph);
    output.plan(&plan);
    Ok(())
}
