//! Project files written as TOML instead of Rust builders.
//!
//! A project directory holds `project.toml` plus `models/`, `views/` and
//! `overlays/` subdirectories. Each file is parsed and validated here; the
//! facade crate walks the directory.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert (loader)
//! ModelFile / Vec<ViewSpec> / OverlayFile / ProjectManifest
//!   ↓ ModelBuilder / Overlay impls
//! Model
//! ```

pub mod config_dto;
pub mod loader;
mod project;

pub use loader::LoadError;
pub use project::{ModelFile, OverlayAction, OverlayFile, ProjectManifest};

use crate::view::ViewSpec;

/// Errors from parsing TOML and loading a project file.
#[derive(Debug, thiserror::Error)]
pub enum LoadFileError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Domain validation failed.
    #[error("{0}")]
    Load(#[from] LoadError),
}

/// Parses a `project.toml`.
///
/// # Errors
///
/// Returns an error if the TOML is malformed.
pub fn load_manifest_from_toml(content: &str) -> Result<ProjectManifest, LoadFileError> {
    let dto: config_dto::ProjectManifestDto = toml::from_str(content)?;
    Ok(loader::load_manifest(dto))
}

/// Parses a model file into a builder named `name`.
///
/// # Errors
///
/// Returns an error if TOML parsing or validation fails.
pub fn load_model_from_toml(name: &str, content: &str) -> Result<ModelFile, LoadFileError> {
    let dto: config_dto::ModelFileDto = toml::from_str(content)?;
    Ok(loader::load_model(name, dto)?)
}

/// Parses a view file into specs.
///
/// # Errors
///
/// Returns an error if TOML parsing or validation fails.
pub fn load_views_from_toml(content: &str) -> Result<Vec<ViewSpec>, LoadFileError> {
    let dto: config_dto::ViewFileDto = toml::from_str(content)?;
    Ok(loader::load_views(dto)?)
}

/// Parses an overlay file into an overlay named `name`.
///
/// # Errors
///
/// Returns an error if TOML parsing or validation fails.
pub fn load_overlay_from_toml(name: &str, content: &str) -> Result<OverlayFile, LoadFileError> {
    let dto: config_dto::OverlayFileDto = toml::from_str(content)?;
    Ok(loader::load_overlay(name, dto)?)
}
