//! List views command implementation.

use std::path::PathBuf;

use anyhow::Result;
use archdiag::{Config, Project};

use super::project_dir;

/// Runs the list-views command.
pub fn run(project: Option<PathBuf>, config: &Config) -> Result<()> {
    let project = Project::open(project_dir(project, config)?)?;
    let specs = project.view_specs();

    println!("Views in {}:\n", project.name());
    println!("{:<28} {:<16} {:<24} Tags", "Key", "Type", "Subject");
    println!("{}", "-".repeat(80));

    for spec in &specs {
        let tags: Vec<&str> = spec.tags.iter().map(String::as_str).collect();
        println!(
            "{:<28} {:<16} {:<24} {}",
            spec.key,
            spec.view_type.as_str(),
            spec.subject.as_deref().unwrap_or("-"),
            tags.join(", ")
        );
    }

    println!("\n{} view(s). Build a subset with:", specs.len());
    println!("  archdiag generate --views <key> --tags <tag> --modules <module>");
    Ok(())
}
