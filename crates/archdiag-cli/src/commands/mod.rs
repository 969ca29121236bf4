//! Subcommand implementations and the shared project/exit-code plumbing.

pub mod generate;
pub mod init;
pub mod list_modules;
pub mod list_plugins;
pub mod list_views;

use std::path::PathBuf;

use anyhow::Result;
use archdiag::{list_projects, BuildError, Config, ProjectError};

/// Exit code for a failed generation.
pub const EXIT_FAILED: u8 = 1;
/// Exit code when the project or selected views do not exist.
pub const EXIT_NOT_FOUND: u8 = 2;
/// Exit code when the output cannot be written.
pub const EXIT_WRITE_FAILED: u8 = 3;

/// CLI-level failures that carry their own exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// No project given and none could be inferred.
    #[error("no project given; pass --project or set default_project (available: {available})")]
    NoProject {
        /// Comma-separated project names found in the projects directory.
        available: String,
    },

    /// Output could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Maps an error chain to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(e) = err.downcast_ref::<CliError>() {
        return match e {
            CliError::NoProject { .. } => EXIT_NOT_FOUND,
            CliError::Write { .. } => EXIT_WRITE_FAILED,
        };
    }
    if err
        .downcast_ref::<BuildError>()
        .is_some_and(BuildError::is_not_found)
        || err
            .downcast_ref::<ProjectError>()
            .is_some_and(ProjectError::is_not_found)
    {
        return EXIT_NOT_FOUND;
    }
    EXIT_FAILED
}

/// The project directory to use: `--project`, else `default_project` under
/// `projects_dir`, else the only project in `projects_dir`.
///
/// # Errors
///
/// Returns [`CliError::NoProject`] when none of these applies.
pub fn project_dir(explicit: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let projects_dir = config.projects_dir();
    if let Some(name) = &config.default_project {
        return Ok(projects_dir.join(name));
    }
    let available = list_projects(&projects_dir).unwrap_or_default();
    if let [only] = available.as_slice() {
        tracing::debug!("Using the only project in {}: {only}", projects_dir.display());
        return Ok(projects_dir.join(only));
    }
    let available = if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    };
    Err(CliError::NoProject { available }.into())
}
