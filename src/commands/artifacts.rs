// ABOUTME: Artifacts command implementation.
// ABOUTME: Renders taskdef.json and appspec.json for the deploy stage.

use stackplan::error::{Error, Result};
use stackplan::output::Output;
use stackplan::pipeline::{BuildArtifacts, validate_pipeline};
use stackplan::store::ParameterStore;
use std::path::Path;

use super::Project;

pub fn artifacts(project: &Project, out: &Path, output: &Output) -> Result<()> {
    let config = &project.config;
    let pipeline = config.pipeline.as_ref().ok_or(Error::NotDeclared("pipeline"))?;
    validate_pipeline(pipeline)?;

    let role_arn = match pipeline.build.container.execution_role.as_deref() {
        Some(key) => Some(project.store().get(&config.parameter_name(key)?)?),
        None => None,
    };

    let out = if out.is_absolute() {
        out.to_path_buf()
    } else {
        project.dir.join(out)
    };

    let rendered = BuildArtifacts::render(pipeline, &config.region, role_arn.as_deref());
    for path in rendered.write(&out, pipeline)? {
        output.progress(&format!("  ✓ {}", path.display()));
    }
    output.success(&format!("Rendered artifacts for {}", pipeline.name));
    Ok(())
}
