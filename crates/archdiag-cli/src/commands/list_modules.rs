//! List modules command implementation.

use std::path::PathBuf;

use anyhow::Result;
use archdiag::{list_modules, Config, Project};

use super::project_dir;

/// Runs the list-modules command.
pub fn run(project: Option<PathBuf>, config: &Config) -> Result<()> {
    let project = Project::open(project_dir(project, config)?)?;
    let modules = list_modules(&project.view_specs());

    if modules.is_empty() {
        println!("No view in {} has a subject.", project.name());
        return Ok(());
    }
    for module in modules {
        println!("{module}");
    }
    Ok(())
}
