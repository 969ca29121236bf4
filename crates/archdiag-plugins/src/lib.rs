//! # archdiag-plugins
//!
//! Built-in plugins for archdiag.
//!
//! ## Available Plugins
//!
//! | Kind | Key | Description |
//! |------|-----|-------------|
//! | Exporter | `structurizr` | Structurizr DSL workspace |
//! | Exporter | `json` | Flat JSON graph of people, systems and relationships |
//! | Tagging | `none` | Leaves tags untouched |
//! | Tagging | `auto_external` | Tags third-party looking systems `external` |
//! | Tagging | `auto_broker_queue` | Tags broker and queue containers |
//! | View generator | `delta_lineage` | Before/after views around a replaced container |
//!
//! ## Usage
//!
//! ```
//! use archdiag_plugins::PluginRegistry;
//!
//! let registry = PluginRegistry::with_builtins();
//! assert!(registry.exporter(" JSON ").is_some());
//! assert_eq!(registry.list_tagging_strategies(), ["auto_broker_queue", "auto_external", "none"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod delta_lineage;
mod exporters;
mod registry;
mod tagging;

pub use delta_lineage::{ContainerRef, DeltaLineage, DeltaLineageConfig};
pub use exporters::{JsonExporter, StructurizrExporter};
pub use registry::{normalize_key, PluginRegistry};
pub use tagging::{AutoBrokerQueue, AutoExternal, NoTagging};

/// Re-export core plugin traits for convenience.
pub use archdiag_core::{Exporter, PluginError, TaggingStrategy, ViewGenerator};
