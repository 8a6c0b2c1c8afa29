// ABOUTME: Parameter store subcommands.
// ABOUTME: Reads, writes and lists values using manifest key resolution.

use serde::Serialize;
use stackplan::error::Result;
use stackplan::output::{Output, OutputMode};
use stackplan::store::ParameterStore;
use stackplan::types::ParameterName;

use super::Project;

#[derive(Serialize)]
struct Entry<'a> {
    name: &'a ParameterName,
    value: &'a str,
}

pub fn params_get(project: &Project, key: &str, output: &Output) -> Result<()> {
    let name = project.config.parameter_name(key)?;
    let value = project.store().get(&name)?;

    if output.mode() == OutputMode::Json {
        output.json(&Entry {
            name: &name,
            value: &value,
        });
    } else {
        println!("{value}");
    }
    Ok(())
}

pub fn params_put(project: &Project, key: &str, value: &str, output: &Output) -> Result<()> {
    let name = project.config.parameter_name(key)?;
    project.store().put(&name, value)?;
    output.success(&format!("Stored {name}"));
    Ok(())
}

pub fn params_list(project: &Project, output: &Output) -> Result<()> {
    let store = project.store();
    let mut entries = Vec::new();
    for name in store.list()? {
        let value = store.get(&name)?;
        entries.push((name, value));
    }

    match output.mode() {
        OutputMode::Json => {
            let listed: Vec<Entry<'_>> = entries
                .iter()
                .map(|(name, value)| Entry { name, value })
                .collect();
            output.json(&listed);
        }
        OutputMode::Quiet => {
            for (name, _) in &entries {
                println!("{name}");
            }
        }
        OutputMode::Normal => {
            for (name, value) in &entries {
                println!("{name} = {value}");
            }
        }
    }
    Ok(())
}
