//! In-memory C4 model: people, software systems, containers, components,
//! deployment nodes, relationships, views and styles.
//!
//! All constructors are idempotent by logical identity. Calling
//! [`Model::add_software_system`] twice with the same name returns the same
//! id and merges non-empty fields into the existing element; the same holds
//! for containers (per system) and components (per container). People are the
//! exception: every [`Model::add_person`] call registers a new person, and the
//! id registry disambiguates (`alice`, `alice-2`).
//!
//! Lookups by name fail with a [`ModelError`] when the name was never
//! declared.

mod element;
mod relationship;
mod replace;
mod restrict;
mod styles;

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use crate::error::ModelError;
use crate::names::split_path;
use crate::view::{View, ViewType};

pub use element::{Element, ElementId, ElementKind};
pub use relationship::{Relationship, RelationshipKey, RelationshipSpec};
pub use replace::{ReplaceOptions, ReplaceReport};
pub use restrict::RelationshipLimit;
pub use styles::{ElementStyle, RelationshipStyle, Styles};

use element::IdRegistry;

/// Default tag carried by deployment instances.
pub const DEFAULT_INSTANCE_TAG: &str = "Instance";

/// Prefix selecting a person in lookup keys (`person:Customer`).
pub const PERSON_PREFIX: &str = "person:";

/// Root of the C4 model (a system landscape).
#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    description: String,
    elements: HashMap<ElementId, Element>,
    people: Vec<ElementId>,
    systems: Vec<ElementId>,
    deployment_nodes: Vec<ElementId>,
    relationships: Vec<Relationship>,
    relationship_keys: HashSet<RelationshipKey>,
    allowed_pairs: Option<HashSet<(String, String)>>,
    views: Vec<View>,
    styles: Styles,
    groups: IndexMap<String, Vec<ElementId>>,
    ids: IdRegistry,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Workspace name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Workspace description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Renames the workspace.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replaces the workspace description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    // ────────────────────────────────────────────
    // Element construction
    // ────────────────────────────────────────────

    /// Registers a new person. Never merges.
    pub fn add_person(&mut self, name: &str, description: &str) -> ElementId {
        let id = self.register(ElementKind::Person, name, description, None);
        self.people.push(id.clone());
        id
    }

    /// Adds a software system, or merges into the existing one with this name.
    pub fn add_software_system(&mut self, name: &str, description: &str) -> ElementId {
        if let Some(id) = self.find_system(name) {
            if let Some(existing) = self.elements.get_mut(&id) {
                existing.merge(description, None, &[]);
            }
            return id;
        }
        let id = self.register(ElementKind::SoftwareSystem, name, description, None);
        self.systems.push(id.clone());
        id
    }

    /// Adds a container to `system`, or merges into the existing one with this name.
    ///
    /// # Errors
    ///
    /// Returns an error if `system` is unknown or not a software system.
    pub fn add_container(
        &mut self,
        system: &ElementId,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.expect_kind(system, ElementKind::SoftwareSystem)?;
        Ok(self
            .ensure_child(system, ElementKind::Container, name, description, technology)
            .0)
    }

    /// Adds a component to `container`, or merges into the existing one with this name.
    ///
    /// # Errors
    ///
    /// Returns an error if `container` is unknown or not a container.
    pub fn add_component(
        &mut self,
        container: &ElementId,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.expect_kind(container, ElementKind::Container)?;
        Ok(self
            .ensure_child(container, ElementKind::Component, name, description, technology)
            .0)
    }

    /// Adds a top-level deployment node.
    pub fn add_deployment_node(
        &mut self,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> ElementId {
        let id = self.register(ElementKind::DeploymentNode, name, description, technology);
        self.deployment_nodes.push(id.clone());
        id
    }

    /// Adds a deployment node nested under `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is not a deployment node.
    pub fn add_child_deployment_node(
        &mut self,
        parent: &ElementId,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.expect_kind(parent, ElementKind::DeploymentNode)?;
        let id = self.register(ElementKind::DeploymentNode, name, description, technology);
        self.attach(parent, &id);
        Ok(id)
    }

    /// Adds an infrastructure node to a deployment node.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is not a deployment node.
    pub fn add_infrastructure_node(
        &mut self,
        node: &ElementId,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.expect_kind(node, ElementKind::DeploymentNode)?;
        let id = self.register(ElementKind::InfrastructureNode, name, description, technology);
        self.attach(node, &id);
        Ok(id)
    }

    /// Deploys an instance of `system` on `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is not a deployment node or `system` is not a system.
    pub fn add_software_system_instance(
        &mut self,
        node: &ElementId,
        system: &ElementId,
        instance_tag: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.expect_kind(node, ElementKind::DeploymentNode)?;
        self.expect_kind(system, ElementKind::SoftwareSystem)?;
        Ok(self.add_instance(node, system, ElementKind::SoftwareSystemInstance, instance_tag))
    }

    /// Deploys an instance of `container` on `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is not a deployment node or `container` is not a container.
    pub fn add_container_instance(
        &mut self,
        node: &ElementId,
        container: &ElementId,
        instance_tag: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.expect_kind(node, ElementKind::DeploymentNode)?;
        self.expect_kind(container, ElementKind::Container)?;
        Ok(self.add_instance(node, container, ElementKind::ContainerInstance, instance_tag))
    }

    /// Unions `tags` into the element's tags.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is unknown.
    pub fn add_tags<I, S>(&mut self, id: &ElementId, tags: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let element = self
            .elements
            .get_mut(id)
            .ok_or_else(|| ModelError::UnknownElement { id: id.to_string() })?;
        element.tags.extend(tags.into_iter().map(Into::into));
        Ok(())
    }

    /// Sets the technology of an element when it has none.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is unknown.
    pub fn merge_technology(&mut self, id: &ElementId, technology: &str) -> Result<(), ModelError> {
        let element = self
            .elements
            .get_mut(id)
            .ok_or_else(|| ModelError::UnknownElement { id: id.to_string() })?;
        element.merge("", Some(technology), &[]);
        Ok(())
    }

    // ────────────────────────────────────────────
    // Relationships
    // ────────────────────────────────────────────

    /// Adds a relationship, or returns the existing one with the same identity.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is unknown.
    pub fn add_relationship(
        &mut self,
        source: &ElementId,
        destination: &ElementId,
        spec: RelationshipSpec,
    ) -> Result<&Relationship, ModelError> {
        let key = RelationshipKey {
            source: self.require(source)?.name.clone(),
            destination: self.require(destination)?.name.clone(),
            description: spec.description.clone(),
            technology: spec.technology.clone(),
        };
        if self.relationship_keys.contains(&key) {
            if let Some(pos) = self.relationships.iter().rposition(|r| self.key_of(r) == key) {
                return Ok(&self.relationships[pos]);
            }
        }
        self.relationships.push(Relationship {
            source: source.clone(),
            destination: destination.clone(),
            description: spec.description,
            technology: spec.technology,
            tags: spec.tags.into_iter().collect(),
        });
        self.relationship_keys.insert(key);
        let last = self.relationships.len() - 1;
        Ok(&self.relationships[last])
    }

    /// Adds a relationship between two elements addressed by lookup key
    /// (see [`Model::get`]).
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint cannot be found or the description is empty.
    pub fn relate(
        &mut self,
        from: &str,
        to: &str,
        spec: RelationshipSpec,
    ) -> Result<&Relationship, ModelError> {
        let source = self.get(from)?;
        let destination = self.get(to)?;
        if spec.description.is_empty() {
            return Err(ModelError::EmptyRelationshipDescription {
                source_name: from.to_string(),
                destination_name: to.to_string(),
            });
        }
        self.add_relationship(&source, &destination, spec)
    }

    /// All relationships in insertion order, ignoring any restriction.
    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Identity key of a relationship.
    #[must_use]
    pub fn key_of(&self, relationship: &Relationship) -> RelationshipKey {
        RelationshipKey {
            source: self.name_of(&relationship.source).to_string(),
            destination: self.name_of(&relationship.destination).to_string(),
            description: relationship.description.clone(),
            technology: relationship.technology.clone(),
        }
    }

    // ────────────────────────────────────────────
    // Lookup
    // ────────────────────────────────────────────

    /// Looks up a software system by display name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownSystem`] if it was never declared.
    pub fn get_system(&self, name: &str) -> Result<ElementId, ModelError> {
        self.find_system(name).ok_or_else(|| ModelError::UnknownSystem {
            name: name.to_string(),
        })
    }

    /// Looks up a container by system and container display names.
    ///
    /// # Errors
    ///
    /// Returns an error if the system or the container was never declared.
    pub fn get_container(&self, system: &str, name: &str) -> Result<ElementId, ModelError> {
        let system_id = self.get_system(system)?;
        self.find_child(&system_id, ElementKind::Container, name)
            .ok_or_else(|| ModelError::UnknownContainer {
                system: system.to_string(),
                name: name.to_string(),
            })
    }

    /// Looks up a person by display name (first match).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownPerson`] if no such person exists.
    pub fn get_person(&self, name: &str) -> Result<ElementId, ModelError> {
        self.people
            .iter()
            .find(|id| self.name_of(id) == name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownPerson {
                name: name.to_string(),
            })
    }

    /// Unified lookup: `"person:Name"`, `"System/Container"` or `"System"`.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying typed lookup.
    pub fn get(&self, key: &str) -> Result<ElementId, ModelError> {
        if let Some(person) = key.strip_prefix(PERSON_PREFIX) {
            return self.get_person(person);
        }
        if let Some((system, container)) = split_path(key) {
            return self.get_container(system, container);
        }
        self.get_system(key)
    }

    /// Whether [`Model::get`] would succeed for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    /// Returns the element with this id.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Display name of an element, empty when unknown.
    #[must_use]
    pub fn name_of(&self, id: &ElementId) -> &str {
        self.elements.get(id).map_or("", |e| e.name.as_str())
    }

    /// People in declaration order.
    pub fn people(&self) -> impl Iterator<Item = &Element> + '_ {
        self.people.iter().filter_map(|id| self.elements.get(id))
    }

    /// Software systems in declaration order.
    pub fn software_systems(&self) -> impl Iterator<Item = &Element> + '_ {
        self.systems.iter().filter_map(|id| self.elements.get(id))
    }

    /// Top-level deployment nodes in declaration order.
    pub fn deployment_nodes(&self) -> impl Iterator<Item = &Element> + '_ {
        self.deployment_nodes
            .iter()
            .filter_map(|id| self.elements.get(id))
    }

    /// Children of `parent` with the given kind, in insertion order.
    pub fn children_of<'a>(
        &'a self,
        parent: &ElementId,
        kind: ElementKind,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements
            .get(parent)
            .map(|p| p.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.elements.get(id))
            .filter(move |e| e.kind == kind)
    }

    /// Every element in a stable order: people, then each system followed by
    /// its containers and their components (depth-first), then deployment
    /// nodes with their infrastructure, instances and nested nodes.
    pub fn iter_elements(&self) -> impl Iterator<Item = &Element> + '_ {
        let mut order: Vec<&ElementId> = Vec::with_capacity(self.elements.len());
        order.extend(self.people.iter());
        for system in &self.systems {
            order.push(system);
            for container in self.child_ids(system, ElementKind::Container) {
                order.push(container);
                order.extend(self.child_ids(container, ElementKind::Component));
            }
        }
        for node in &self.deployment_nodes {
            self.collect_deployment(node, &mut order);
        }
        order.into_iter().filter_map(|id| self.elements.get(id))
    }

    /// Nearest ancestor software system, excluding the element itself.
    #[must_use]
    pub fn parent_system(&self, id: &ElementId) -> Option<&ElementId> {
        self.ancestor_of_kind(id, ElementKind::SoftwareSystem)
    }

    /// Nearest ancestor container, excluding the element itself.
    #[must_use]
    pub fn parent_container(&self, id: &ElementId) -> Option<&ElementId> {
        self.ancestor_of_kind(id, ElementKind::Container)
    }

    /// The element itself when it is a system, otherwise its nearest system ancestor.
    #[must_use]
    pub fn system_of<'a>(&'a self, id: &'a ElementId) -> Option<&'a ElementId> {
        match self.elements.get(id)?.kind {
            ElementKind::SoftwareSystem => Some(id),
            _ => self.parent_system(id),
        }
    }

    // ────────────────────────────────────────────
    // Groups
    // ────────────────────────────────────────────

    /// Adds `system` to the named group; assigning twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if `system` is not a software system.
    pub fn assign_group(&mut self, group: &str, system: &ElementId) -> Result<(), ModelError> {
        self.expect_kind(system, ElementKind::SoftwareSystem)?;
        let members = self.groups.entry(group.to_string()).or_default();
        if !members.contains(system) {
            members.push(system.clone());
        }
        Ok(())
    }

    /// Removes `system` from the named group.
    pub fn unassign_group(&mut self, group: &str, system: &ElementId) {
        if let Some(members) = self.groups.get_mut(group) {
            members.retain(|id| id != system);
        }
    }

    /// Members of a group in assignment order.
    #[must_use]
    pub fn group(&self, group: &str) -> &[ElementId] {
        self.groups.get(group).map_or(&[], Vec::as_slice)
    }

    /// All groups in first-assignment order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[ElementId])> + '_ {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// First group containing `system`.
    #[must_use]
    pub fn group_of(&self, system: &ElementId) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, members)| members.contains(system))
            .map(|(name, _)| name.as_str())
    }

    // ────────────────────────────────────────────
    // Views and styles
    // ────────────────────────────────────────────

    /// Attaches a view. A view with the same key is replaced in place.
    pub fn add_view(&mut self, view: View) -> &mut View {
        if let Some(pos) = self.views.iter().position(|v| v.key == view.key) {
            tracing::debug!("Replacing view '{}'", view.key);
            self.views[pos] = view;
            return &mut self.views[pos];
        }
        self.views.push(view);
        let last = self.views.len() - 1;
        &mut self.views[last]
    }

    /// Adds a system-context view keyed `{Name}Context` for `system`.
    ///
    /// # Errors
    ///
    /// Returns an error if `system` is not a software system.
    pub fn add_context_view_for(&mut self, system: &ElementId) -> Result<&mut View, ModelError> {
        self.add_view_for(system, ViewType::SystemContext, "Context", "System Context")
    }

    /// Adds a container view keyed `{Name}Containers` for `system`.
    ///
    /// # Errors
    ///
    /// Returns an error if `system` is not a software system.
    pub fn add_container_view_for(&mut self, system: &ElementId) -> Result<&mut View, ModelError> {
        self.add_view_for(system, ViewType::Container, "Containers", "Containers")
    }

    /// Views in attachment order.
    #[must_use]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Finds a view by key.
    #[must_use]
    pub fn view(&self, key: &str) -> Option<&View> {
        self.views.iter().find(|v| v.key == key)
    }

    /// Declared styles.
    #[must_use]
    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    /// Mutable access to declared styles.
    pub fn styles_mut(&mut self) -> &mut Styles {
        &mut self.styles
    }

    // ────────────────────────────────────────────
    // Pruning
    // ────────────────────────────────────────────

    /// Drops every person, system and container not in `keep`.
    ///
    /// A system survives when it or any of its containers or components is
    /// kept; a container survives when it or any of its components is kept.
    /// Relationships survive only when both endpoints are kept. Deployment
    /// nodes are left alone.
    pub fn retain(&mut self, keep: &HashSet<ElementId>) {
        let mut removed: Vec<ElementId> = Vec::new();
        for system in self.systems.clone() {
            let containers: Vec<ElementId> = self
                .child_ids(&system, ElementKind::Container)
                .cloned()
                .collect();
            let mut any_nested = false;
            for container in containers {
                let components_kept = self
                    .child_ids(&container, ElementKind::Component)
                    .any(|c| keep.contains(c));
                if keep.contains(&container) || components_kept {
                    any_nested = true;
                } else {
                    removed.push(container);
                }
            }
            if !keep.contains(&system) && !any_nested {
                removed.push(system);
            }
        }
        removed.extend(self.people.iter().filter(|p| !keep.contains(*p)).cloned());
        for id in &removed {
            self.remove_element(id);
        }
        self.relationships
            .retain(|r| keep.contains(&r.source) && keep.contains(&r.destination));
        self.rebuild_relationship_keys();
    }

    // ────────────────────────────────────────────
    // Internals
    // ────────────────────────────────────────────

    fn register(
        &mut self,
        kind: ElementKind,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> ElementId {
        let id = self.ids.allocate(name);
        let mut element = Element::new(id.clone(), kind, name, description);
        element.technology = technology.map(str::to_string);
        self.elements.insert(id.clone(), element);
        id
    }

    fn attach(&mut self, parent: &ElementId, child: &ElementId) {
        if let Some(c) = self.elements.get_mut(child) {
            c.parent = Some(parent.clone());
        }
        if let Some(p) = self.elements.get_mut(parent) {
            p.children.push(child.clone());
        }
    }

    /// Returns the child id and whether it was newly created.
    pub(crate) fn ensure_child(
        &mut self,
        parent: &ElementId,
        kind: ElementKind,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> (ElementId, bool) {
        if let Some(id) = self.find_child(parent, kind, name) {
            if let Some(existing) = self.elements.get_mut(&id) {
                existing.merge(description, technology, &[]);
            }
            return (id, false);
        }
        let id = self.register(kind, name, description, technology);
        self.attach(parent, &id);
        (id, true)
    }

    fn add_instance(
        &mut self,
        node: &ElementId,
        of: &ElementId,
        kind: ElementKind,
        instance_tag: Option<&str>,
    ) -> ElementId {
        let (name, description, technology, tags) = match self.elements.get(of) {
            Some(e) => (
                e.name.clone(),
                e.description.clone(),
                e.technology.clone(),
                e.tags.clone(),
            ),
            None => return of.clone(),
        };
        let id = self.register(kind, &name, &description, technology.as_deref());
        if let Some(instance) = self.elements.get_mut(&id) {
            instance.tags = tags;
            instance.instance_of = Some(of.clone());
            instance.instance_tag = Some(instance_tag.unwrap_or(DEFAULT_INSTANCE_TAG).to_string());
        }
        self.attach(node, &id);
        id
    }

    fn add_view_for(
        &mut self,
        system: &ElementId,
        view_type: ViewType,
        key_suffix: &str,
        title_suffix: &str,
    ) -> Result<&mut View, ModelError> {
        self.expect_kind(system, ElementKind::SoftwareSystem)?;
        let name = self.name_of(system).to_string();
        let mut view = View::new(
            format!("{name}{key_suffix}"),
            format!("{name} {title_suffix}"),
            view_type,
        );
        view.subject = Some(system.clone());
        Ok(self.add_view(view))
    }

    pub(crate) fn find_system(&self, name: &str) -> Option<ElementId> {
        self.systems
            .iter()
            .find(|id| self.name_of(id) == name)
            .cloned()
    }

    fn find_child(&self, parent: &ElementId, kind: ElementKind, name: &str) -> Option<ElementId> {
        self.children_of(parent, kind)
            .find(|e| e.name == name)
            .map(|e| e.id.clone())
    }

    fn child_ids<'a>(
        &'a self,
        parent: &ElementId,
        kind: ElementKind,
    ) -> impl Iterator<Item = &'a ElementId> + 'a {
        self.children_of(parent, kind).map(|e| &e.id)
    }

    fn collect_deployment<'a>(&'a self, node: &'a ElementId, order: &mut Vec<&'a ElementId>) {
        order.push(node);
        for kind in [
            ElementKind::InfrastructureNode,
            ElementKind::SoftwareSystemInstance,
            ElementKind::ContainerInstance,
        ] {
            order.extend(self.child_ids(node, kind));
        }
        for child in self.child_ids(node, ElementKind::DeploymentNode) {
            self.collect_deployment(child, order);
        }
    }

    fn ancestor_of_kind(&self, id: &ElementId, kind: ElementKind) -> Option<&ElementId> {
        let mut current = self.elements.get(id)?.parent.as_ref();
        while let Some(parent_id) = current {
            let parent = self.elements.get(parent_id)?;
            if parent.kind == kind {
                return Some(&parent.id);
            }
            current = parent.parent.as_ref();
        }
        None
    }

    fn require(&self, id: &ElementId) -> Result<&Element, ModelError> {
        self.elements
            .get(id)
            .ok_or_else(|| ModelError::UnknownElement { id: id.to_string() })
    }

    fn expect_kind(&self, id: &ElementId, expected: ElementKind) -> Result<(), ModelError> {
        let element = self.require(id)?;
        if element.kind == expected {
            Ok(())
        } else {
            Err(ModelError::WrongKind {
                id: id.to_string(),
                expected,
                actual: element.kind,
            })
        }
    }

    /// Removes an element and its descendants, detaching it from its parent.
    pub(crate) fn remove_element(&mut self, id: &ElementId) {
        let Some(element) = self.elements.remove(id) else {
            return;
        };
        for child in &element.children {
            self.remove_element(child);
        }
        if let Some(parent) = element.parent.as_ref().and_then(|p| self.elements.get_mut(p)) {
            parent.children.retain(|c| c != id);
        }
        self.people.retain(|p| p != id);
        self.systems.retain(|s| s != id);
        self.deployment_nodes.retain(|d| d != id);
        for members in self.groups.values_mut() {
            members.retain(|m| m != id);
        }
    }

    /// Drops relationships whose endpoints no longer exist.
    pub(crate) fn drop_dangling_relationships(&mut self) {
        let elements = &self.elements;
        self.relationships
            .retain(|r| elements.contains_key(&r.source) && elements.contains_key(&r.destination));
        self.rebuild_relationship_keys();
    }

    pub(crate) fn rebuild_relationship_keys(&mut self) {
        let keys: HashSet<RelationshipKey> =
            self.relationships.iter().map(|r| self.key_of(r)).collect();
        self.relationship_keys = keys;
    }

    pub(crate) fn relationships_mut(&mut self) -> &mut Vec<Relationship> {
        &mut self.relationships
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banking() -> Model {
        let mut m = Model::new("Banking", "");
        m.add_person("Customer", "Bank customer");
        let payments = m.add_software_system("Payments", "Payment processing");
        let api = m
            .add_container(&payments, "Payments API", "REST API", Some("Rust"))
            .unwrap();
        m.add_component(&api, "Router", "", None).unwrap();
        m.add_container(&payments, "Payments DB", "", Some("Postgres"))
            .unwrap();
        m
    }

    // -- Identity --

    #[test]
    fn add_software_system_is_idempotent_and_merges() {
        let mut m = Model::new("T", "");
        let a = m.add_software_system("Core", "");
        let b = m.add_software_system("Core", "Core banking");
        let c = m.add_software_system("Core", "Ignored");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(m.software_systems().count(), 1);
        assert_eq!(m.element(&a).unwrap().description, "Core banking");
    }

    #[test]
    fn add_container_is_idempotent_per_system() {
        let mut m = Model::new("T", "");
        let s = m.add_software_system("S", "");
        let first = m.add_container(&s, "API", "", None).unwrap();
        let second = m.add_container(&s, "API", "API service", Some("Python")).unwrap();
        assert_eq!(first, second);
        let api = m.element(&first).unwrap();
        assert_eq!(api.description, "API service");
        assert_eq!(api.technology.as_deref(), Some("Python"));
        assert_eq!(m.children_of(&s, ElementKind::Container).count(), 1);
    }

    #[test]
    fn people_with_same_name_get_distinct_ids() {
        let mut m = Model::new("T", "");
        let a = m.add_person("Alice", "");
        let b = m.add_person("Alice", "");
        assert_eq!(a.as_str(), "alice");
        assert_eq!(b.as_str(), "alice-2");
    }

    #[test]
    fn container_requires_a_system_parent() {
        let mut m = Model::new("T", "");
        let p = m.add_person("User", "");
        let err = m.add_container(&p, "API", "", None).unwrap_err();
        assert!(matches!(err, ModelError::WrongKind { .. }));
    }

    // -- Lookup --

    #[test]
    fn lookups_fail_before_declaration() {
        let m = banking();
        assert!(matches!(
            m.get_system("Ledger"),
            Err(ModelError::UnknownSystem { .. })
        ));
        assert!(matches!(
            m.get_container("Payments", "Kafka"),
            Err(ModelError::UnknownContainer { .. })
        ));
        assert!(matches!(
            m.get_person("Auditor"),
            Err(ModelError::UnknownPerson { .. })
        ));
    }

    #[test]
    fn unified_get_supports_all_key_forms() {
        let m = banking();
        assert_eq!(m.get("Payments").unwrap().as_str(), "payments");
        assert_eq!(m.get("Payments/Payments API").unwrap().as_str(), "payments-api");
        assert_eq!(m.get("person:Customer").unwrap().as_str(), "customer");
        assert!(m.contains("Payments/Payments DB"));
        assert!(!m.contains("Payments/Kafka"));
    }

    #[test]
    fn iter_elements_is_depth_first_in_declaration_order() {
        let m = banking();
        let names: Vec<&str> = m.iter_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Customer", "Payments", "Payments API", "Router", "Payments DB"]
        );
    }

    #[test]
    fn ancestors_are_resolved_through_parents() {
        let m = banking();
        let router = m.get_container("Payments", "Payments API").unwrap();
        let router = m
            .children_of(&router, ElementKind::Component)
            .next()
            .unwrap()
            .id
            .clone();
        assert_eq!(m.parent_system(&router).unwrap().as_str(), "payments");
        assert_eq!(m.parent_container(&router).unwrap().as_str(), "payments-api");
        let payments = m.get_system("Payments").unwrap();
        assert_eq!(m.system_of(&payments), Some(&payments));
        assert!(m.parent_system(&payments).is_none());
    }

    // -- Relationships --

    #[test]
    fn duplicate_relationship_is_not_added() {
        let mut m = banking();
        let spec = RelationshipSpec::new("Reads/Writes").technology("SQL");
        m.relate("Payments/Payments API", "Payments/Payments DB", spec.clone())
            .unwrap();
        m.relate("Payments/Payments API", "Payments/Payments DB", spec)
            .unwrap();
        assert_eq!(m.relationships().len(), 1);
        m.relate(
            "Payments/Payments API",
            "Payments/Payments DB",
            RelationshipSpec::new("Reads/Writes"),
        )
        .unwrap();
        assert_eq!(m.relationships().len(), 2);
    }

    #[test]
    fn relate_rejects_empty_description() {
        let mut m = banking();
        let err = m
            .relate("person:Customer", "Payments", RelationshipSpec::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::EmptyRelationshipDescription { .. }));
    }

    // -- Groups --

    #[test]
    fn groups_assign_is_unique_and_unassign_removes() {
        let mut m = Model::new("Groups", "");
        let s1 = m.add_software_system("S1", "");
        let s2 = m.add_software_system("S2", "");
        m.assign_group("A", &s1).unwrap();
        m.assign_group("A", &s1).unwrap();
        m.assign_group("A", &s2).unwrap();
        assert_eq!(m.group("A"), &[s1.clone(), s2.clone()]);
        m.unassign_group("A", &s1);
        assert_eq!(m.group("A"), &[s2.clone()]);
        assert_eq!(m.group_of(&s2), Some("A"));
        assert!(m.group("missing").is_empty());
    }

    // -- Views --

    #[test]
    fn view_sugar_uses_conventional_keys() {
        let mut m = Model::new("Get", "");
        let core = m.add_software_system("Core", "");
        assert_eq!(m.add_context_view_for(&core).unwrap().key, "CoreContext");
        assert_eq!(m.add_container_view_for(&core).unwrap().key, "CoreContainers");
        assert_eq!(m.views().len(), 2);
    }

    // -- Deployment --

    #[test]
    fn deployment_instances_copy_their_source() {
        let mut m = banking();
        let api = m.get_container("Payments", "Payments API").unwrap();
        m.add_tags(&api, ["edge"]).unwrap();
        let aws = m.add_deployment_node("AWS", "", Some("Cloud"));
        let eks = m.add_child_deployment_node(&aws, "EKS", "", None).unwrap();
        m.add_infrastructure_node(&aws, "ALB", "Load balancer", None)
            .unwrap();
        let inst = m.add_container_instance(&eks, &api, None).unwrap();

        let instance = m.element(&inst).unwrap();
        assert_eq!(instance.name, "Payments API");
        assert_eq!(instance.technology.as_deref(), Some("Rust"));
        assert!(instance.tags.contains("edge"));
        assert_eq!(instance.instance_tag.as_deref(), Some(DEFAULT_INSTANCE_TAG));
        assert_eq!(instance.instance_of.as_ref(), Some(&api));

        let tail: Vec<&str> = m
            .iter_elements()
            .skip(5)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(tail, vec!["AWS", "ALB", "EKS", "Payments API"]);
    }

    // -- Pruning --

    #[test]
    fn retain_keeps_systems_with_kept_children() {
        let mut m = banking();
        let other = m.add_software_system("Reporting", "");
        m.relate("person:Customer", "Payments", RelationshipSpec::new("Pays"))
            .unwrap();
        m.relate("Reporting", "Payments", RelationshipSpec::new("Reads"))
            .unwrap();
        let api = m.get_container("Payments", "Payments API").unwrap();
        let customer = m.get_person("Customer").unwrap();
        let keep: HashSet<ElementId> = [api.clone(), customer.clone()].into_iter().collect();
        m.retain(&keep);

        assert!(m.element(&other).is_none());
        assert!(m.contains("Payments"));
        assert!(m.contains("Payments/Payments API"));
        assert!(!m.contains("Payments/Payments DB"));
        assert!(m.relationships().is_empty());
    }
}
