// ABOUTME: Seed command implementation.
// ABOUTME: Publishes external parameter values declared in the manifest.

use stackplan::error::Result;
use stackplan::output::Output;
use stackplan::store::ParameterStore;

use super::Project;

pub fn seed(project: &Project, force: bool, output: &Output) -> Result<()> {
    let store = project.store();
    let mut written = 0;

    for (name, value) in project.config.external_seeds()? {
        if !force && store.contains(&name)? {
            output.progress(&format!("  - {name} already set, skipping"));
            continue;
        }
        store.put(&name, &value)?;
        output.progress(&format!("  ✓ {name}"));
        written += 1;
    }

    output.success(&format!("Seeded {written} parameter(s)"));
    Ok(())
}
