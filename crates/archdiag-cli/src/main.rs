//! archdiag CLI tool.
//!
//! Usage:
//! ```bash
//! archdiag generate [OPTIONS]
//! archdiag list-views [--project DIR]
//! archdiag list-modules [--project DIR]
//! archdiag list-plugins
//! archdiag init
//! ```
//!
//! Exit codes: 0 success, 1 generation failed, 2 not found, 3 write failed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// C4 architecture diagrams as code
#[derive(Parser)]
#[command(name = "archdiag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a workspace document from a project
    Generate(commands::generate::GenerateArgs),

    /// List the views a project defines
    ListViews {
        /// Project directory (default: from config)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// List view modules (first subject segment)
    ListModules {
        /// Project directory (default: from config)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// List registered exporters, tagging strategies and view generators
    ListPlugins,

    /// Write a starter archdiag.toml and sample project
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command, cli.config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.verbose {
                eprintln!("error: {e:?}");
            } else {
                eprintln!("error: {e:#}");
            }
            ExitCode::from(commands::exit_code(&e))
        }
    }
}

fn run(command: Commands, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let source = config_resolver::resolve(std::path::Path::new("."), config_path.as_deref());

    match command {
        Commands::Generate(args) => commands::generate::run(args, &source.load()?),
        Commands::ListViews { project } => commands::list_views::run(project, &source.load()?),
        Commands::ListModules { project } => {
            commands::list_modules::run(project, &source.load()?)
        }
        Commands::ListPlugins => {
            commands::list_plugins::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(std::path::Path::new("."), force),
    }
}
