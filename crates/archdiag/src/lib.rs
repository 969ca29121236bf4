//! # archdiag
//!
//! C4 architecture diagrams as code.
//!
//! This is the facade crate: it re-exports the core model and plugin crates
//! and adds the build pipeline that turns a project directory into a single
//! document.
//!
//! ## Pipeline
//!
//! | Step | Failure handling |
//! |------|------------------|
//! | Open the project (manifest, models, views, overlays) | fatal |
//! | Compose model files, base project first | fatal |
//! | Apply overlays | logged, skipped |
//! | Apply tagging strategies | logged, rolled back |
//! | Merge, select and build views | fatal |
//! | Run the view generator | logged, skipped |
//! | Prune the model to the built views | - |
//! | Export (optionally through the result cache) | fatal; cache errors logged |
//!
//! ## Example
//!
//! ```no_run
//! use archdiag::plugins::PluginRegistry;
//! use archdiag::{build, BuildRequest, Selection};
//!
//! let registry = PluginRegistry::with_builtins();
//! let request = BuildRequest::new("projects/shop")
//!     .selection(Selection::all().tag("overview"))
//!     .tagging("auto_external")
//!     .prune_to_views(true);
//!
//! let output = build(&request, &registry)?;
//! std::fs::write("workspace.dsl", &output.text)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use archdiag_core::*;

/// Built-in exporters, tagging strategies, view generators and the registry.
pub mod plugins {
    pub use archdiag_plugins::*;
}

mod build;
mod cache;
mod discover;
mod prune;

pub use build::{build, BuildError, BuildOutput, BuildRequest, DEFAULT_EXPORTER};
pub use discover::{list_projects, Project, ProjectError, ViewFile, MANIFEST_FILE};
pub use prune::prune_to_views;
