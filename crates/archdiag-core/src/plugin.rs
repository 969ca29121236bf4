//! Plugin traits for exporters, tagging strategies and view generators.
//!
//! Implementations live in `archdiag-plugins`; orchestration looks them up by
//! key in an explicit registry.

use crate::error::ModelError;
use crate::model::Model;
use crate::view::ViewSpec;

/// Errors raised by plugins.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The plugin configuration is invalid.
    #[error("{plugin}: invalid configuration: {message}")]
    Config {
        /// Plugin key.
        plugin: String,
        /// What is wrong.
        message: String,
    },

    /// A model lookup failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Serialization failed.
    #[error("{plugin}: serialization failed: {source}")]
    Serialize {
        /// Plugin key.
        plugin: String,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Renders a model (with its built views) to text.
pub trait Exporter: Send + Sync {
    /// Registry key, e.g. `structurizr`.
    fn key(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str {
        ""
    }

    /// Renders the model.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be rendered in this format.
    fn export(&self, model: &Model) -> Result<String, PluginError>;
}

/// Mutates element tags in place.
pub trait TaggingStrategy: Send + Sync {
    /// Registry key, e.g. `auto_external`.
    fn key(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str {
        ""
    }

    /// Applies the strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if tagging fails; callers treat this as non-fatal.
    fn apply(&self, model: &mut Model) -> Result<(), PluginError>;
}

/// Derives view specs from a model and a JSON configuration.
pub trait ViewGenerator: Send + Sync {
    /// Registry key, e.g. `delta_lineage`.
    fn key(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str {
        ""
    }

    /// Produces specs.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Config`] when `config` is missing required fields.
    fn generate(
        &self,
        model: &Model,
        config: &serde_json::Value,
    ) -> Result<Vec<ViewSpec>, PluginError>;
}

/// Boxed exporter.
pub type ExporterBox = Box<dyn Exporter>;
/// Boxed tagging strategy.
pub type TaggingStrategyBox = Box<dyn TaggingStrategy>;
/// Boxed view generator.
pub type ViewGeneratorBox = Box<dyn ViewGenerator>;
