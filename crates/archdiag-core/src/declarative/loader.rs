//! DTO → Domain conversion with validation.

use std::collections::HashSet;

use crate::model::ReplaceOptions;
use crate::view::{ViewSpec, ViewType};

use super::config_dto::{
    ModelFileDto, OverlayFileDto, ProjectManifestDto, ViewDto, ViewFileDto,
};
use super::project::{ModelFile, OverlayAction, OverlayFile, ProjectManifest};

/// Errors during DTO → Domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// A required text field is blank.
    #[error("{context}: must not be empty")]
    EmptyField {
        /// Where the error occurred (e.g., "systems[0].name").
        context: String,
    },

    /// Unknown view type string.
    #[error(
        "{context}: unknown view type `{value}`, expected: SystemLandscape, SystemContext, Container, Component"
    )]
    UnknownViewType {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Cross-record errors within one file.
    #[error("view validation errors:\n{}", format_errors(.0))]
    CrossRef(Vec<String>),
}

fn format_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn require(value: &str, context: impl FnOnce() -> String) -> Result<(), LoadError> {
    if value.trim().is_empty() {
        return Err(LoadError::EmptyField { context: context() });
    }
    Ok(())
}

// ────────────────────────────────────────────
// project.toml
// ────────────────────────────────────────────

/// Converts a `ProjectManifestDto`.
#[must_use]
pub fn load_manifest(dto: ProjectManifestDto) -> ProjectManifest {
    let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
    ProjectManifest {
        name: non_blank(dto.name),
        workspace_name: non_blank(dto.workspace_name),
        description: dto.description,
        extends: non_blank(dto.extends),
    }
}

// ────────────────────────────────────────────
// Model files
// ────────────────────────────────────────────

/// Converts a `ModelFileDto` into a [`ModelFile`] builder named `name`.
///
/// # Errors
///
/// Returns the first blank name or description found.
pub fn load_model(name: &str, dto: ModelFileDto) -> Result<ModelFile, LoadError> {
    for (i, person) in dto.people.iter().enumerate() {
        require(&person.name, || format!("people[{i}].name"))?;
    }
    for (i, system) in dto.systems.iter().enumerate() {
        require(&system.name, || format!("systems[{i}].name"))?;
        for (j, container) in system.containers.iter().enumerate() {
            require(&container.name, || {
                format!("systems[{i}].containers[{j}].name")
            })?;
            for (k, component) in container.components.iter().enumerate() {
                require(&component.name, || {
                    format!("systems[{i}].containers[{j}].components[{k}].name")
                })?;
            }
        }
    }
    for (i, rel) in dto.relationships.iter().enumerate() {
        require(&rel.from, || format!("relationships[{i}].from"))?;
        require(&rel.to, || format!("relationships[{i}].to"))?;
        require(&rel.description, || format!("relationships[{i}].description"))?;
    }
    for (i, node) in dto.deployment.iter().enumerate() {
        validate_node(node, &format!("deployment[{i}]"))?;
    }
    for (i, style) in dto.styles.elements.iter().enumerate() {
        require(&style.tag, || format!("styles.elements[{i}].tag"))?;
    }
    for (i, style) in dto.styles.relationships.iter().enumerate() {
        require(&style.tag, || format!("styles.relationships[{i}].tag"))?;
    }
    Ok(ModelFile::new(name, dto))
}

fn validate_node(
    node: &super::config_dto::DeploymentNodeDto,
    context: &str,
) -> Result<(), LoadError> {
    require(&node.name, || format!("{context}.name"))?;
    for (i, infra) in node.infrastructure.iter().enumerate() {
        require(&infra.name, || format!("{context}.infrastructure[{i}].name"))?;
    }
    for (i, instance) in node.instances.iter().enumerate() {
        require(&instance.of, || format!("{context}.instances[{i}].of"))?;
    }
    for (i, child) in node.children.iter().enumerate() {
        validate_node(child, &format!("{context}.children[{i}]"))?;
    }
    Ok(())
}

// ────────────────────────────────────────────
// View files
// ────────────────────────────────────────────

/// Converts a `ViewFileDto` into view specs, in file order.
///
/// # Errors
///
/// Returns the first field error, or every duplicated key at once.
pub fn load_views(dto: ViewFileDto) -> Result<Vec<ViewSpec>, LoadError> {
    let specs = dto
        .views
        .into_iter()
        .enumerate()
        .map(|(i, v)| convert_view(v, i))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    let duplicates: Vec<String> = specs
        .iter()
        .filter(|s| !seen.insert(s.key.clone()))
        .map(|s| format!("duplicate view key `{}`", s.key))
        .collect();
    if !duplicates.is_empty() {
        return Err(LoadError::CrossRef(duplicates));
    }
    Ok(specs)
}

fn convert_view(dto: ViewDto, index: usize) -> Result<ViewSpec, LoadError> {
    require(&dto.key, || format!("views[{index}].key"))?;
    let view_type: ViewType =
        dto.view_type
            .parse()
            .map_err(|_| LoadError::UnknownViewType {
                context: format!("views[{index}].view_type"),
                value: dto.view_type.clone(),
            })?;

    let name = dto
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| dto.key.clone());
    let mut spec = ViewSpec::new(dto.key, name, view_type)
        .description(dto.description)
        .smart(dto.smart);
    if let Some(subject) = dto.subject.filter(|s| !s.trim().is_empty()) {
        spec = spec.subject(subject);
    }
    for tag in dto.tags {
        spec = spec.tag(tag);
    }
    for include in dto.includes {
        spec = spec.include(include);
    }
    for exclude in dto.excludes {
        spec = spec.exclude(exclude);
    }
    for filter in dto.filters {
        spec = spec.filter(filter);
    }
    spec.extends = dto.extends.filter(|e| !e.trim().is_empty());
    Ok(spec)
}

// ────────────────────────────────────────────
// Overlay files
// ────────────────────────────────────────────

/// Converts an `OverlayFileDto` into an [`OverlayFile`] named `name`.
///
/// Replacements run before tagging so tags can target the new containers.
///
/// # Errors
///
/// Returns the first blank required field.
pub fn load_overlay(name: &str, dto: OverlayFileDto) -> Result<OverlayFile, LoadError> {
    let mut actions = Vec::with_capacity(dto.replace_container.len() + dto.tag.len());
    for (i, r) in dto.replace_container.into_iter().enumerate() {
        require(&r.system, || format!("replace_container[{i}].system"))?;
        require(&r.old, || format!("replace_container[{i}].old"))?;
        require(&r.new, || format!("replace_container[{i}].new"))?;
        actions.push(OverlayAction::ReplaceContainer {
            system: r.system,
            old: r.old,
            new: r.new,
            options: ReplaceOptions {
                description: r.description,
                technology: r.technology,
                tag_new: r.tag_new,
                tag_old: r.tag_old,
                remove_old: r.remove_old,
            },
        });
    }
    for (i, t) in dto.tag.into_iter().enumerate() {
        require(&t.element, || format!("tag[{i}].element"))?;
        actions.push(OverlayAction::Tag {
            element: t.element,
            tags: t.tags,
        });
    }
    Ok(OverlayFile::new(name, actions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarative::config_dto::{PersonDto, SystemDto};

    fn system(name: &str) -> SystemDto {
        SystemDto {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            group: None,
            containers: Vec::new(),
        }
    }

    #[test]
    fn blank_system_name_reports_context() {
        let dto = ModelFileDto {
            systems: vec![system("Portal"), system("  ")],
            ..Default::default()
        };
        let err = load_model("m", dto).unwrap_err();
        assert_eq!(
            err,
            LoadError::EmptyField {
                context: "systems[1].name".into()
            }
        );
    }

    #[test]
    fn blank_person_name_rejected() {
        let dto = ModelFileDto {
            people: vec![PersonDto {
                name: String::new(),
                description: "x".into(),
                tags: Vec::new(),
            }],
            ..Default::default()
        };
        assert!(matches!(
            load_model("m", dto),
            Err(LoadError::EmptyField { .. })
        ));
    }

    #[test]
    fn manifest_blank_fields_become_none() {
        let manifest = load_manifest(ProjectManifestDto {
            name: Some(" ".into()),
            workspace_name: Some("Shop".into()),
            description: String::new(),
            extends: Some(String::new()),
        });
        assert_eq!(manifest.name, None);
        assert_eq!(manifest.workspace_name.as_deref(), Some("Shop"));
        assert_eq!(manifest.extends, None);
    }
}
