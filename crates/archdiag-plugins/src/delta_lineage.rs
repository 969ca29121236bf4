//! Before/after views around a replaced container.
//!
//! Given the container being replaced and its successor, produces:
//!
//! - `{name}`: every relationship touching either container
//! - `{name}After`: only the successor's relationships
//!
//! Both views include the owning systems plus any `include_systems`.

use serde::Deserialize;

use archdiag_core::{Model, NameFilter, PluginError, ViewGenerator, ViewSpec, ViewType};

/// A `{ system, container }` pair in the generator config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContainerRef {
    /// Owning system.
    #[serde(default)]
    pub system: String,
    /// Container name; blank means no adjacency filters for this side.
    #[serde(default)]
    pub container: String,
}

impl ContainerRef {
    /// `System/Container`, or `None` when no container is set.
    #[must_use]
    pub fn path(&self) -> Option<String> {
        let (system, container) = (self.system.trim(), self.container.trim());
        if container.is_empty() {
            return None;
        }
        Some(format!("{system}/{container}"))
    }
}

/// `delta_lineage` configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaLineageConfig {
    /// Key of the combined view; the after view is `{name}After`.
    pub name: String,
    /// Display title (defaults to `name`).
    #[serde(default)]
    pub title: Option<String>,
    /// Description of the combined view.
    #[serde(default)]
    pub description: Option<String>,
    /// Container being replaced.
    #[serde(default)]
    pub before: ContainerRef,
    /// Replacement container.
    #[serde(default)]
    pub after: ContainerRef,
    /// Extra systems to include.
    #[serde(default)]
    pub include_systems: Vec<String>,
    /// `SystemLandscape` (default) or another view type.
    #[serde(default)]
    pub view_type: Option<String>,
}

/// The `delta_lineage` view generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaLineage;

impl DeltaLineage {
    const KEY: &'static str = "delta_lineage";

    fn config_error(message: impl Into<String>) -> PluginError {
        PluginError::Config {
            plugin: Self::KEY.to_string(),
            message: message.into(),
        }
    }

    /// Builds both specs from a parsed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Config`] for a blank name or unknown view type.
    pub fn specs(config: &DeltaLineageConfig) -> Result<Vec<ViewSpec>, PluginError> {
        let name = config.name.trim();
        if name.is_empty() {
            return Err(Self::config_error("`name` is required"));
        }
        let view_type = match config.view_type.as_deref() {
            None => ViewType::SystemLandscape,
            Some(raw) => raw
                .parse()
                .map_err(|e: archdiag_core::ParseViewTypeError| Self::config_error(e.to_string()))?,
        };
        let title = config
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(name);
        let smart = view_type == ViewType::SystemLandscape;
        let (before, after) = (config.before.path(), config.after.path());

        let mut includes: Vec<String> = Vec::new();
        for selector in [&config.before.system, &config.after.system]
            .into_iter()
            .chain(&config.include_systems)
            .map(|s| s.trim().to_string())
        {
            if !selector.is_empty() && !includes.contains(&selector) {
                includes.push(selector);
            }
        }

        let description = config
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| {
                format!(
                    "Delta: {} -> {}",
                    config.before.container.trim(),
                    config.after.container.trim()
                )
            });
        let mut combined = ViewSpec::new(name, title, view_type)
            .description(description)
            .smart(smart);
        for path in [&before, &after].into_iter().flatten() {
            combined = adjacency(combined, path);
        }

        let mut after_only = ViewSpec::new(format!("{name}After"), format!("{title} (After)"), view_type)
            .description(format!("After: {}", config.after.container.trim()))
            .smart(smart);
        if let Some(path) = &after {
            after_only = adjacency(after_only, path);
        }

        for selector in &includes {
            combined = combined.include(selector.as_str());
            after_only = after_only.include(selector.as_str());
        }
        Ok(vec![combined, after_only])
    }
}

/// Adds `* -> path` and `path -> *` relationship includes.
fn adjacency(spec: ViewSpec, path: &str) -> ViewSpec {
    spec.filter(NameFilter::include(None, Some(path)))
        .filter(NameFilter::include(Some(path), None))
}

impl ViewGenerator for DeltaLineage {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn description(&self) -> &'static str {
        "Before/after views around a replaced container"
    }

    fn generate(
        &self,
        _model: &Model,
        config: &serde_json::Value,
    ) -> Result<Vec<ViewSpec>, PluginError> {
        let config: DeltaLineageConfig = serde_json::from_value(config.clone())
            .map_err(|e| Self::config_error(e.to_string()))?;
        let specs = Self::specs(&config)?;
        tracing::debug!("delta_lineage produced {} view(s)", specs.len());
        Ok(specs)
    }
}
