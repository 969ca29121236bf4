//! Built-in exporters.

use serde_json::{json, Value};

use archdiag_core::export::dump_dsl;
use archdiag_core::{Element, ElementKind, Exporter, Model, PluginError};

/// Structurizr DSL exporter.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructurizrExporter;

impl Exporter for StructurizrExporter {
    fn key(&self) -> &'static str {
        "structurizr"
    }

    fn description(&self) -> &'static str {
        "Structurizr DSL workspace"
    }

    fn export(&self, model: &Model) -> Result<String, PluginError> {
        Ok(dump_dsl(model))
    }
}

/// JSON graph exporter.
///
/// Pretty-printed with sorted keys. Relationships are listed in full, not
/// filtered by any active restriction.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl JsonExporter {
    const KEY: &'static str = "json";
}

impl Exporter for JsonExporter {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn description(&self) -> &'static str {
        "JSON graph of people, systems, containers and relationships"
    }

    fn export(&self, model: &Model) -> Result<String, PluginError> {
        let people: Vec<Value> = model
            .people()
            .map(|p| {
                json!({
                    "name": p.name,
                    "description": p.description,
                    "tags": p.sorted_tags(),
                })
            })
            .collect();

        let systems: Vec<Value> = model
            .software_systems()
            .map(|s| {
                let containers: Vec<Value> = model
                    .children_of(&s.id, ElementKind::Container)
                    .map(|c| {
                        let components: Vec<Value> = model
                            .children_of(&c.id, ElementKind::Component)
                            .map(technical)
                            .collect();
                        let mut obj = technical(c);
                        obj["components"] = Value::Array(components);
                        obj
                    })
                    .collect();
                json!({
                    "name": s.name,
                    "description": s.description,
                    "tags": s.sorted_tags(),
                    "containers": containers,
                })
            })
            .collect();

        let relationships: Vec<Value> = model
            .relationships()
            .iter()
            .map(|r| {
                json!({
                    "source": model.name_of(&r.source),
                    "destination": model.name_of(&r.destination),
                    "description": r.description,
                    "technology": r.technology.as_deref().unwrap_or(""),
                })
            })
            .collect();

        let graph = json!({
            "name": model.name(),
            "people": people,
            "systems": systems,
            "relationships": relationships,
        });
        serde_json::to_string_pretty(&graph).map_err(|source| PluginError::Serialize {
            plugin: Self::KEY.to_string(),
            source,
        })
    }
}

fn technical(e: &Element) -> Value {
    json!({
        "name": e.name,
        "description": e.description,
        "technology": e.technology.as_deref().unwrap_or(""),
        "tags": e.sorted_tags(),
    })
}
