//! Explicit plugin registry keyed by normalized name.

use indexmap::IndexMap;

use archdiag_core::{
    Exporter, ExporterBox, TaggingStrategy, TaggingStrategyBox, ViewGenerator, ViewGeneratorBox,
};

use crate::{AutoBrokerQueue, AutoExternal, DeltaLineage, JsonExporter, NoTagging, StructurizrExporter};

/// Normalizes a registry key: trimmed and lower-cased.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Exporters, tagging strategies and view generators available to a build.
///
/// Constructed once at startup and passed by reference; registering a key
/// that already exists replaces the previous plugin.
#[derive(Default)]
pub struct PluginRegistry {
    exporters: IndexMap<String, ExporterBox>,
    tagging: IndexMap<String, TaggingStrategyBox>,
    generators: IndexMap<String, ViewGeneratorBox>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in plugin.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_exporter(Box::new(StructurizrExporter));
        registry.register_exporter(Box::new(JsonExporter));
        registry.register_tagging_strategy(Box::new(NoTagging));
        registry.register_tagging_strategy(Box::new(AutoExternal));
        registry.register_tagging_strategy(Box::new(AutoBrokerQueue));
        registry.register_view_generator(Box::new(DeltaLineage));
        registry
    }

    /// Registers an exporter under its key.
    pub fn register_exporter(&mut self, exporter: ExporterBox) {
        let key = normalize_key(exporter.key());
        tracing::debug!("Registered exporter '{key}'");
        self.exporters.insert(key, exporter);
    }

    /// Registers a tagging strategy under its key.
    pub fn register_tagging_strategy(&mut self, strategy: TaggingStrategyBox) {
        let key = normalize_key(strategy.key());
        tracing::debug!("Registered tagging strategy '{key}'");
        self.tagging.insert(key, strategy);
    }

    /// Registers a view generator under its key.
    pub fn register_view_generator(&mut self, generator: ViewGeneratorBox) {
        let key = normalize_key(generator.key());
        tracing::debug!("Registered view generator '{key}'");
        self.generators.insert(key, generator);
    }

    /// Looks up an exporter.
    #[must_use]
    pub fn exporter(&self, key: &str) -> Option<&dyn Exporter> {
        self.exporters.get(&normalize_key(key)).map(|p| &**p)
    }

    /// Looks up a tagging strategy.
    #[must_use]
    pub fn tagging_strategy(&self, key: &str) -> Option<&dyn TaggingStrategy> {
        self.tagging.get(&normalize_key(key)).map(|p| &**p)
    }

    /// Looks up a view generator.
    #[must_use]
    pub fn view_generator(&self, key: &str) -> Option<&dyn ViewGenerator> {
        self.generators.get(&normalize_key(key)).map(|p| &**p)
    }

    /// Sorted exporter keys.
    #[must_use]
    pub fn list_exporters(&self) -> Vec<&str> {
        sorted_keys(&self.exporters)
    }

    /// Sorted tagging strategy keys.
    #[must_use]
    pub fn list_tagging_strategies(&self) -> Vec<&str> {
        sorted_keys(&self.tagging)
    }

    /// Sorted view generator keys.
    #[must_use]
    pub fn list_view_generators(&self) -> Vec<&str> {
        sorted_keys(&self.generators)
    }

    /// Descriptions of every plugin, grouped by kind, sorted by key.
    #[must_use]
    pub fn describe(&self) -> Vec<(&'static str, &str, &'static str)> {
        let mut rows = Vec::new();
        for key in self.list_exporters() {
            if let Some(p) = self.exporters.get(key) {
                rows.push(("exporter", key, p.description()));
            }
        }
        for key in self.list_tagging_strategies() {
            if let Some(p) = self.tagging.get(key) {
                rows.push(("tagging", key, p.description()));
            }
        }
        for key in self.list_view_generators() {
            if let Some(p) = self.generators.get(key) {
                rows.push(("view-generator", key, p.description()));
            }
        }
        rows
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("exporters", &self.list_exporters())
            .field("tagging", &self.list_tagging_strategies())
            .field("generators", &self.list_view_generators())
            .finish()
    }
}

fn sorted_keys<V>(map: &IndexMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}
