// ABOUTME: Init command implementation.
// ABOUTME: Writes the template manifest into the working directory.

use stackplan::config::{CONFIG_FILENAME, InitOptions, init_config};
use stackplan::error::Result;
use stackplan::output::Output;
use std::path::Path;

pub fn init(dir: &Path, options: &InitOptions, output: &Output) -> Result<()> {
    init_config(dir, options)?;
    output.success(&format!("Created {}", dir.join(CONFIG_FILENAME).display()));
    Ok(())
}
