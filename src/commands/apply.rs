// ABOUTME: Apply command implementation.
// ABOUTME: Runs the plan through the configured provisioner, or only previews it with --dry-run.

use stackplan::apply::{ApplyContext, CommandProvisioner, Executor, missing_externals};
use stackplan::diagnostics::Warning;
use stackplan::error::{Error, Result};
use stackplan::graph::ApplyPlan;
use stackplan::output::{Output, OutputMode};

use super::{Project, check, print_warnings};

pub async fn apply(project: &Project, dry_run: bool, mut output: Output) -> Result<()> {
    let config = &project.config;
    let checked = check(config)?;
    print_warnings(&checked.diagnostics, &output);

    let plan = ApplyPlan::emit(&checked.graph);
    let store = project.store();

    for parameter in missing_externals(&checked.graph, &store)? {
        output.warning(&Warning::missing_external(parameter));
    }

    if dry_run {
        output.plan(&plan);
        if output.mode() != OutputMode::Json {
            output.success(&format!("Dry run: {} stack(s) would be applied", plan.len()));
        }
        return Ok(());
    }

    let provisioner_config = config
        .provisioner
        .as_ref()
        .ok_or(Error::NotDeclared("provisioner"))?;
    let provisioner = CommandProvisioner::from_config(provisioner_config).working_dir(&project.dir);
    let context = ApplyContext {
        region: config.region.clone(),
        account: config.account.clone(),
    };

    output.start_timer();
    output.progress(&format!(
        "Applying {} stack(s) in {}",
        plan.len(),
        config.region
    ));

    let report = Executor::new(&store, &provisioner, context)
        .run(&plan, &output)
        .await?;

    if output.mode() == OutputMode::Json {
        output.json(&report);
    } else {
        output.success(&format!("Applied {} stack(s)", report.applied.len()));
    }
    Ok(())
}
