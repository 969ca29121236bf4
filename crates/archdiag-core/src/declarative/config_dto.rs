//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain types via the loader.

use serde::Deserialize;

use crate::model::{ElementStyle, RelationshipStyle};
use crate::view::NameFilter;

// ────────────────────────────────────────────
// project.toml
// ────────────────────────────────────────────

/// Raw `project.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectManifestDto {
    /// Project name (defaults to the directory name).
    #[serde(default)]
    pub name: Option<String>,
    /// Workspace name used in the exported document.
    #[serde(default)]
    pub workspace_name: Option<String>,
    /// Workspace description.
    #[serde(default)]
    pub description: String,
    /// Base project, resolved as a sibling directory.
    #[serde(default)]
    pub extends: Option<String>,
}

// ────────────────────────────────────────────
// models/*.toml
// ────────────────────────────────────────────

/// Raw model file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelFileDto {
    /// `[[people]]`
    #[serde(default)]
    pub people: Vec<PersonDto>,
    /// `[[systems]]`
    #[serde(default)]
    pub systems: Vec<SystemDto>,
    /// `[[relationships]]`
    #[serde(default)]
    pub relationships: Vec<RelationshipDto>,
    /// `[[deployment]]`
    #[serde(default)]
    pub deployment: Vec<DeploymentNodeDto>,
    /// `[styles]`
    #[serde(default)]
    pub styles: StylesDto,
}

/// A person.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonDto {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A software system with its containers.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemDto {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Group the system belongs to.
    #[serde(default)]
    pub group: Option<String>,
    /// `[[systems.containers]]`
    #[serde(default)]
    pub containers: Vec<ContainerDto>,
}

/// A container with its components.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerDto {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Technology.
    #[serde(default)]
    pub technology: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// `[[systems.containers.components]]`
    #[serde(default)]
    pub components: Vec<ComponentDto>,
}

/// A component.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentDto {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Technology.
    #[serde(default)]
    pub technology: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A relationship between two lookup keys.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipDto {
    /// Source key (`System`, `System/Container`, `person:Name`).
    pub from: String,
    /// Destination key.
    pub to: String,
    /// Description.
    pub description: String,
    /// Technology.
    #[serde(default)]
    pub technology: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A deployment node.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentNodeDto {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Technology.
    #[serde(default)]
    pub technology: Option<String>,
    /// Nested nodes.
    #[serde(default)]
    pub children: Vec<DeploymentNodeDto>,
    /// Infrastructure nodes.
    #[serde(default)]
    pub infrastructure: Vec<InfrastructureDto>,
    /// Deployed instances.
    #[serde(default)]
    pub instances: Vec<InstanceDto>,
}

/// An infrastructure node.
#[derive(Debug, Clone, Deserialize)]
pub struct InfrastructureDto {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Technology.
    #[serde(default)]
    pub technology: Option<String>,
}

/// A deployed instance of a system (`System`) or container (`System/Container`).
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceDto {
    /// What is deployed.
    pub of: String,
    /// Instance tag.
    #[serde(default)]
    pub tag: Option<String>,
}

/// `[styles]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StylesDto {
    /// `[[styles.elements]]`
    #[serde(default)]
    pub elements: Vec<ElementStyle>,
    /// `[[styles.relationships]]`
    #[serde(default)]
    pub relationships: Vec<RelationshipStyle>,
    /// Theme URLs.
    #[serde(default)]
    pub themes: Vec<String>,
}

// ────────────────────────────────────────────
// views/*.toml
// ────────────────────────────────────────────

/// Raw view file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewFileDto {
    /// `[[views]]`
    #[serde(default)]
    pub views: Vec<ViewDto>,
}

/// A view spec.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewDto {
    /// Unique key.
    pub key: String,
    /// Title (defaults to the key).
    #[serde(default)]
    pub name: Option<String>,
    /// `SystemLandscape`, `SystemContext`, `Container`, `Component`.
    pub view_type: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Selection tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Include selectors.
    #[serde(default)]
    pub includes: Vec<String>,
    /// Exclude selectors (element names).
    #[serde(default)]
    pub excludes: Vec<String>,
    /// `[[views.filters]]`
    #[serde(default)]
    pub filters: Vec<NameFilter>,
    /// Subject path.
    #[serde(default)]
    pub subject: Option<String>,
    /// Smart landscape.
    #[serde(default)]
    pub smart: bool,
    /// Base view key.
    #[serde(default)]
    pub extends: Option<String>,
}

// ────────────────────────────────────────────
// overlays/*.toml
// ────────────────────────────────────────────

/// Raw overlay file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverlayFileDto {
    /// `[[replace_container]]`
    #[serde(default)]
    pub replace_container: Vec<ReplaceContainerDto>,
    /// `[[tag]]`
    #[serde(default)]
    pub tag: Vec<TagDto>,
}

/// Container replacement action.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceContainerDto {
    /// Owning system.
    pub system: String,
    /// Container to replace.
    pub old: String,
    /// Replacement container.
    pub new: String,
    /// Description for the new container.
    #[serde(default)]
    pub description: String,
    /// Technology for the new container.
    #[serde(default)]
    pub technology: Option<String>,
    /// Tags for the new container.
    #[serde(default)]
    pub tag_new: Vec<String>,
    /// Tags for the old container.
    #[serde(default)]
    pub tag_old: Vec<String>,
    /// Remove the old container (default: true).
    #[serde(default = "default_true")]
    pub remove_old: bool,
}

/// Tagging action.
#[derive(Debug, Clone, Deserialize)]
pub struct TagDto {
    /// Lookup key of the element.
    pub element: String,
    /// Tags to add.
    pub tags: Vec<String>,
}

fn default_true() -> bool {
    true
}
