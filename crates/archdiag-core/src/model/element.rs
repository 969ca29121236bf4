//! Elements of the C4 model and their identity.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::names::slugify;

/// Stable, model-unique element identifier derived from the display name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The C4 element variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// A human user.
    Person,
    /// A software system.
    SoftwareSystem,
    /// A container inside a software system.
    Container,
    /// A component inside a container.
    Component,
    /// A deployment node (may nest).
    DeploymentNode,
    /// Infrastructure attached to a deployment node.
    InfrastructureNode,
    /// A deployed instance of a software system.
    SoftwareSystemInstance,
    /// A deployed instance of a container.
    ContainerInstance,
}

impl ElementKind {
    /// Whether this kind belongs to the deployment sub-model.
    #[must_use]
    pub fn is_deployment(self) -> bool {
        matches!(
            self,
            Self::DeploymentNode
                | Self::InfrastructureNode
                | Self::SoftwareSystemInstance
                | Self::ContainerInstance
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Person => "Person",
            Self::SoftwareSystem => "SoftwareSystem",
            Self::Container => "Container",
            Self::Component => "Component",
            Self::DeploymentNode => "DeploymentNode",
            Self::InfrastructureNode => "InfrastructureNode",
            Self::SoftwareSystemInstance => "SoftwareSystemInstance",
            Self::ContainerInstance => "ContainerInstance",
        };
        f.write_str(s)
    }
}

/// A single model element.
///
/// Ownership runs parent → children through `children`; `parent` is only a
/// back-reference by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Unique id within the owning model.
    pub id: ElementId,
    /// Variant.
    pub kind: ElementKind,
    /// Display name.
    pub name: String,
    /// Free-text description (may be empty).
    pub description: String,
    /// Technology label.
    pub technology: Option<String>,
    /// Tags, kept sorted.
    pub tags: BTreeSet<String>,
    /// Owning element.
    pub parent: Option<ElementId>,
    /// Owned elements in insertion order.
    pub children: Vec<ElementId>,
    /// For deployment instances: the system or container being deployed.
    pub instance_of: Option<ElementId>,
    /// For deployment instances: the instance tag.
    pub instance_tag: Option<String>,
}

impl Element {
    pub(crate) fn new(id: ElementId, kind: ElementKind, name: &str, description: &str) -> Self {
        Self {
            id,
            kind,
            name: name.to_string(),
            description: description.to_string(),
            technology: None,
            tags: BTreeSet::new(),
            parent: None,
            children: Vec::new(),
            instance_of: None,
            instance_tag: None,
        }
    }

    /// Fills empty fields from the given values and unions tags.
    ///
    /// Non-empty existing values are never overwritten.
    pub fn merge(&mut self, description: &str, technology: Option<&str>, tags: &[String]) {
        if self.description.is_empty() && !description.is_empty() {
            self.description = description.to_string();
        }
        if self.technology.as_deref().map_or(true, str::is_empty) {
            if let Some(tech) = technology.filter(|t| !t.is_empty()) {
                self.technology = Some(tech.to_string());
            }
        }
        self.tags.extend(tags.iter().cloned());
    }

    /// Tags in sorted order.
    #[must_use]
    pub fn sorted_tags(&self) -> Vec<&str> {
        self.tags.iter().map(String::as_str).collect()
    }
}

/// Allocates model-unique ids from display names.
///
/// Ids are never released, so a removed element's id is not reused.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdRegistry {
    taken: HashSet<String>,
}

impl IdRegistry {
    /// Registers a new id for `name`, appending `-2`, `-3`, … on collision.
    pub(crate) fn allocate(&mut self, name: &str) -> ElementId {
        let mut base = slugify(name);
        if base.is_empty() {
            base = "item".to_string();
        }
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        self.taken.insert(candidate.clone());
        ElementId(candidate)
    }
}
