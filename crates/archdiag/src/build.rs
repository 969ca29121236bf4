//! The build pipeline: project directory in, exported document out.

use std::path::{Path, PathBuf};

use serde_json::json;

use archdiag_core::{
    apply_overlays, select_views, Exporter, Model, ModelError, PluginError, Selection, ViewError,
};
use archdiag_plugins::PluginRegistry;

use crate::cache::ResultCache;
use crate::discover::{Project, ProjectError};
use crate::prune::prune_to_views;

/// Exporter used when none is requested or the requested key is unknown.
pub const DEFAULT_EXPORTER: &str = "structurizr";

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The project could not be opened.
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Composition hit an unresolved reference.
    #[error("model composition failed: {0}")]
    Model(#[from] ModelError),

    /// A project view failed to build.
    #[error("failed to build view: {0}")]
    View(#[from] ViewError),

    /// A selection was given and nothing matched it.
    #[error("no views matched the selection")]
    NoViewsSelected,

    /// Neither the requested exporter nor the default is registered.
    #[error("no exporter registered for '{requested}' and no 'structurizr' fallback")]
    NoExporter {
        /// Requested key.
        requested: String,
    },

    /// The exporter failed.
    #[error("exporter '{exporter}' failed: {source}")]
    Export {
        /// Exporter key.
        exporter: String,
        /// Underlying plugin error.
        source: PluginError,
    },
}

impl BuildError {
    /// Whether the failure means "nothing to build" rather than "build broke".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Project(e) => e.is_not_found(),
            Self::NoViewsSelected => true,
            _ => false,
        }
    }
}

/// Parameters of one build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    project_dir: PathBuf,
    selection: Selection,
    exporter: String,
    tagging: Vec<String>,
    view_generator: Option<(String, serde_json::Value)>,
    prune_to_views: bool,
    cache_dir: Option<PathBuf>,
}

impl BuildRequest {
    /// Builds every view of the project at `project_dir` with the default exporter.
    #[must_use]
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            selection: Selection::all(),
            exporter: DEFAULT_EXPORTER.to_string(),
            tagging: Vec::new(),
            view_generator: None,
            prune_to_views: false,
            cache_dir: None,
        }
    }

    /// Restricts the views built.
    #[must_use]
    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the exporter key.
    #[must_use]
    pub fn exporter(mut self, key: impl Into<String>) -> Self {
        self.exporter = key.into();
        self
    }

    /// Adds a tagging strategy; strategies run in the order added.
    #[must_use]
    pub fn tagging(mut self, key: impl Into<String>) -> Self {
        self.tagging.push(key.into());
        self
    }

    /// Runs a view generator after the project views are built.
    #[must_use]
    pub fn view_generator(mut self, key: impl Into<String>, config: serde_json::Value) -> Self {
        self.view_generator = Some((key.into(), config));
        self
    }

    /// Prunes the model to what the views reference before exporting.
    #[must_use]
    pub fn prune_to_views(mut self, prune: bool) -> Self {
        self.prune_to_views = prune;
        self
    }

    /// Enables the export cache in `dir`.
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Project directory.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn cache_params(&self, exporter: &str) -> serde_json::Value {
        let (generator, config) = self
            .view_generator
            .as_ref()
            .map_or((String::new(), json!({})), |(k, c)| (k.clone(), c.clone()));
        json!({
            "project": self.project_dir.to_string_lossy(),
            "select_names": self.selection.names,
            "select_tags": self.selection.tags,
            "select_modules": self.selection.modules,
            "exporter": exporter,
            "tagging": self.tagging,
            "prune_to_views": self.prune_to_views,
            "view_generator": generator,
            "view_generator_config": config,
        })
    }
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Exported document.
    pub text: String,
    /// Keys of the views built, project views first.
    pub views: Vec<String>,
    /// Exporter that produced `text`.
    pub exporter: String,
    /// Whether `text` came from the cache.
    pub from_cache: bool,
}

/// Runs the pipeline for `request` using plugins from `registry`.
///
/// # Errors
///
/// Returns an error when the project cannot be opened, composition or a
/// project view fails, a non-empty selection matches nothing, or the
/// exporter fails. Overlay, tagging, view generator and cache failures are
/// logged and skipped.
pub fn build(request: &BuildRequest, registry: &PluginRegistry) -> Result<BuildOutput, BuildError> {
    let project = Project::open(&request.project_dir)?;
    tracing::info!("Building project '{}'", project.name());

    let mut model = project.compose()?;
    let overlays = project.overlays();
    let applied = apply_overlays(&mut model, &overlays);
    if !overlays.is_empty() {
        tracing::debug!("Applied {applied}/{} overlay(s)", overlays.len());
    }
    apply_tagging(&mut model, &request.tagging, registry);

    let specs = project.view_specs();
    let selected = select_views(&specs, &request.selection);
    if selected.is_empty() && !request.selection.is_empty() {
        return Err(BuildError::NoViewsSelected);
    }
    let mut views = Vec::with_capacity(selected.len());
    for spec in &selected {
        spec.build(&mut model)?;
        views.push(spec.key.clone());
    }
    tracing::debug!("Built {} of {} view(s)", selected.len(), specs.len());

    if let Some((key, config)) = &request.view_generator {
        views.extend(run_generator(&mut model, key, config, registry));
    }

    if request.prune_to_views && !selected.is_empty() {
        prune_to_views(&mut model);
    }

    let (exporter_key, exporter) = resolve_exporter(&request.exporter, registry)?;
    let cache = request.cache_dir.clone().map(ResultCache::new);
    let cache_key = cache.as_ref().map(|c| {
        tracing::debug!("Using export cache in {}", c.dir().display());
        ResultCache::key(&request.cache_params(exporter_key), &project.source_files())
    });
    if let (Some(cache), Some(key)) = (&cache, &cache_key) {
        if let Some(text) = cache.read(key) {
            return Ok(BuildOutput {
                text,
                views,
                exporter: exporter_key.to_string(),
                from_cache: true,
            });
        }
    }

    let text = exporter.export(&model).map_err(|source| BuildError::Export {
        exporter: exporter_key.to_string(),
        source,
    })?;
    if let (Some(cache), Some(key)) = (&cache, &cache_key) {
        cache.write(key, &text);
    }
    tracing::info!(
        "Exported {} view(s) with '{exporter_key}' ({} bytes)",
        views.len(),
        text.len()
    );

    Ok(BuildOutput {
        text,
        views,
        exporter: exporter_key.to_string(),
        from_cache: false,
    })
}

/// Applies each strategy in order. A failing strategy is rolled back.
fn apply_tagging(model: &mut Model, keys: &[String], registry: &PluginRegistry) {
    for key in keys {
        let Some(strategy) = registry.tagging_strategy(key) else {
            tracing::warn!("Unknown tagging strategy '{key}', skipping");
            continue;
        };
        let snapshot = model.clone();
        match strategy.apply(model) {
            Ok(()) => tracing::debug!("Applied tagging strategy '{}'", strategy.key()),
            Err(e) => {
                tracing::warn!("Tagging strategy '{}' failed: {e}", strategy.key());
                *model = snapshot;
            }
        }
    }
}

/// Builds generated views, returning the keys that built.
fn run_generator(
    model: &mut Model,
    key: &str,
    config: &serde_json::Value,
    registry: &PluginRegistry,
) -> Vec<String> {
    let Some(generator) = registry.view_generator(key) else {
        tracing::warn!("Unknown view generator '{key}', skipping");
        return Vec::new();
    };
    let specs = match generator.generate(model, config) {
        Ok(specs) => specs,
        Err(e) => {
            tracing::warn!("View generator '{}' failed: {e}", generator.key());
            return Vec::new();
        }
    };
    let mut built = Vec::with_capacity(specs.len());
    for spec in specs {
        match spec.build(model) {
            Ok(_) => built.push(spec.key),
            Err(e) => tracing::warn!("Skipping generated view '{}': {e}", spec.key),
        }
    }
    built
}

fn resolve_exporter<'r>(
    requested: &str,
    registry: &'r PluginRegistry,
) -> Result<(&'static str, &'r dyn Exporter), BuildError> {
    if let Some(exporter) = registry.exporter(requested) {
        return Ok((exporter.key(), exporter));
    }
    tracing::warn!("Unknown exporter '{requested}', falling back to '{DEFAULT_EXPORTER}'");
    registry
        .exporter(DEFAULT_EXPORTER)
        .map(|e| (e.key(), e))
        .ok_or_else(|| BuildError::NoExporter {
            requested: requested.to_string(),
        })
}
