//! Validated project files and their model/overlay behaviour.

use crate::builder::{ModelBuilder, Overlay};
use crate::error::ModelError;
use crate::model::{ElementId, ElementKind, Model, RelationshipSpec, ReplaceOptions, Styles};

use super::config_dto::{DeploymentNodeDto, ModelFileDto, RelationshipDto};

/// `project.toml` contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectManifest {
    /// Project name override.
    pub name: Option<String>,
    /// Workspace name used in the document.
    pub workspace_name: Option<String>,
    /// Workspace description.
    pub description: String,
    /// Base project name.
    pub extends: Option<String>,
}

// ────────────────────────────────────────────
// Model files
// ────────────────────────────────────────────

/// A validated model file.
///
/// People, systems, containers, components, groups and styles are declared
/// in the define phase. Relationships and the deployment tree wait for the
/// link phase because they reference elements from other files.
#[derive(Debug, Clone)]
pub struct ModelFile {
    name: String,
    content: ModelFileDto,
}

impl ModelFile {
    pub(crate) fn new(name: impl Into<String>, content: ModelFileDto) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Number of relationships the file declares.
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.content.relationships.len()
    }
}

impl ModelBuilder for ModelFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn define(&self, model: &mut Model) -> Result<(), ModelError> {
        for person in &self.content.people {
            let id = model.add_person(&person.name, &person.description);
            model.add_tags(&id, person.tags.iter().cloned())?;
        }

        for system in &self.content.systems {
            let sys = model.add_software_system(&system.name, &system.description);
            model.add_tags(&sys, system.tags.iter().cloned())?;
            if let Some(group) = &system.group {
                model.assign_group(group, &sys)?;
            }
            for container in &system.containers {
                let cont = model.add_container(
                    &sys,
                    &container.name,
                    &container.description,
                    container.technology.as_deref(),
                )?;
                model.add_tags(&cont, container.tags.iter().cloned())?;
                for component in &container.components {
                    let comp = model.add_component(
                        &cont,
                        &component.name,
                        &component.description,
                        component.technology.as_deref(),
                    )?;
                    model.add_tags(&comp, component.tags.iter().cloned())?;
                }
            }
        }

        merge_styles(model.styles_mut(), &self.content.styles);
        Ok(())
    }

    fn link(&self, model: &mut Model) -> Result<(), ModelError> {
        for rel in &self.content.relationships {
            model.relate(&rel.from, &rel.to, relationship_spec(rel))?;
        }
        for node in &self.content.deployment {
            let id = model.add_deployment_node(
                &node.name,
                &node.description,
                node.technology.as_deref(),
            );
            populate_node(model, &id, node)?;
        }
        Ok(())
    }
}

fn relationship_spec(rel: &RelationshipDto) -> RelationshipSpec {
    let mut spec = RelationshipSpec::new(rel.description.as_str());
    if let Some(tech) = &rel.technology {
        spec = spec.technology(tech.as_str());
    }
    for tag in &rel.tags {
        spec = spec.tag(tag.as_str());
    }
    spec
}

fn merge_styles(styles: &mut Styles, declared: &super::config_dto::StylesDto) {
    for style in &declared.elements {
        styles.add_element(style.clone());
    }
    for style in &declared.relationships {
        styles.add_relationship(style.clone());
    }
    for theme in &declared.themes {
        if !styles.themes.contains(theme) {
            styles.themes.push(theme.clone());
        }
    }
}

fn populate_node(
    model: &mut Model,
    node_id: &ElementId,
    node: &DeploymentNodeDto,
) -> Result<(), ModelError> {
    for infra in &node.infrastructure {
        model.add_infrastructure_node(
            node_id,
            &infra.name,
            &infra.description,
            infra.technology.as_deref(),
        )?;
    }
    for instance in &node.instances {
        let target = model.get(&instance.of)?;
        let kind = model
            .element(&target)
            .map(|e| e.kind)
            .ok_or_else(|| ModelError::UnknownElement {
                id: target.to_string(),
            })?;
        match kind {
            ElementKind::SoftwareSystem => {
                model.add_software_system_instance(node_id, &target, instance.tag.as_deref())?;
            }
            ElementKind::Container => {
                model.add_container_instance(node_id, &target, instance.tag.as_deref())?;
            }
            actual => {
                return Err(ModelError::WrongKind {
                    id: target.to_string(),
                    expected: ElementKind::Container,
                    actual,
                });
            }
        }
    }
    for child in &node.children {
        let child_id = model.add_child_deployment_node(
            node_id,
            &child.name,
            &child.description,
            child.technology.as_deref(),
        )?;
        populate_node(model, &child_id, child)?;
    }
    Ok(())
}

// ────────────────────────────────────────────
// Overlay files
// ────────────────────────────────────────────

/// One structural edit from an overlay file.
#[derive(Debug, Clone)]
pub enum OverlayAction {
    /// Swap a container and rewire its relationships.
    ReplaceContainer {
        /// Owning system.
        system: String,
        /// Container being replaced.
        old: String,
        /// Replacement container.
        new: String,
        /// Replacement options.
        options: ReplaceOptions,
    },
    /// Add tags to an element.
    Tag {
        /// Lookup key.
        element: String,
        /// Tags to add.
        tags: Vec<String>,
    },
}

/// A validated overlay file: actions applied in file order.
#[derive(Debug, Clone)]
pub struct OverlayFile {
    name: String,
    actions: Vec<OverlayAction>,
}

impl OverlayFile {
    pub(crate) fn new(name: impl Into<String>, actions: Vec<OverlayAction>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }

    /// The actions in application order.
    #[must_use]
    pub fn actions(&self) -> &[OverlayAction] {
        &self.actions
    }
}

impl Overlay for OverlayFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, model: &mut Model) -> Result<(), ModelError> {
        for action in &self.actions {
            match action {
                OverlayAction::ReplaceContainer {
                    system,
                    old,
                    new,
                    options,
                } => {
                    let report = model.replace_container(system, old, new, options.clone())?;
                    tracing::debug!(
                        "Replaced {system}/{old} with {system}/{new}: {} relationship(s) rewired",
                        report.rewired_count
                    );
                }
                OverlayAction::Tag { element, tags } => {
                    let id = model.get(element)?;
                    model.add_tags(&id, tags.iter().cloned())?;
                }
            }
        }
        Ok(())
    }
}
