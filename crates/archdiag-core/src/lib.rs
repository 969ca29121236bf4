//! # archdiag-core
//!
//! Core of the archdiag C4 diagram generator.
//!
//! This crate provides:
//!
//! - [`Model`], the in-memory C4 graph with idempotent constructors
//! - [`ViewSpec`], the declarative form of a diagram, and its [`View`] once built
//! - [`export::dump_dsl`], the Structurizr DSL generator
//! - [`ModelBuilder`], [`ViewSource`] and [`Overlay`] contribution traits
//! - [`Exporter`], [`TaggingStrategy`] and [`ViewGenerator`] plugin traits
//! - [`declarative`] loading of TOML project files
//!
//! ## Example
//!
//! ```
//! use archdiag_core::{export, Model, RelationshipSpec, ViewSpec, ViewType};
//!
//! let mut model = Model::new("Demo", "");
//! model.add_person("User", "End user");
//! let portal = model.add_software_system("Portal", "Customer portal");
//! model.add_container(&portal, "Frontend", "SPA", Some("React"))?;
//! model.relate("person:User", "Portal", RelationshipSpec::new("uses").technology("HTTPS"))?;
//!
//! ViewSpec::new("Landscape", "Landscape", ViewType::SystemLandscape)
//!     .include("person:User")
//!     .include("Portal")
//!     .build(&mut model)?;
//!
//! let dsl = export::dump_dsl(&model);
//! assert!(dsl.contains("uses"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod model;
mod plugin;
mod view;

pub mod declarative;
pub mod export;
pub mod names;

pub use builder::{
    apply_overlays, compose, ModelBuilder, ModelBuilderBox, Overlay, OverlayBox, ViewSource,
};
pub use config::{CacheConfig, Config, ConfigError, ViewGeneratorConfig};
pub use error::{ModelError, ViewError};
pub use model::{
    Element, ElementId, ElementKind, ElementStyle, Model, Relationship, RelationshipKey,
    RelationshipLimit, RelationshipSpec, RelationshipStyle, ReplaceOptions, ReplaceReport,
    Styles, DEFAULT_INSTANCE_TAG, PERSON_PREFIX,
};
pub use plugin::{
    Exporter, ExporterBox, PluginError, TaggingStrategy, TaggingStrategyBox, ViewGenerator,
    ViewGeneratorBox,
};
pub use view::{
    list_modules, merge_specs, select_views, FilterKind, NameFilter, ParseViewTypeError, Query,
    RelationshipFilter, Selection, Selector, View, ViewSpec, ViewType,
};
