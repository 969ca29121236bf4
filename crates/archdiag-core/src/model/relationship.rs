//! Directed relationships between elements.

use std::collections::BTreeSet;

use super::ElementId;

/// A "uses" edge between two elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Source element.
    pub source: ElementId,
    /// Destination element.
    pub destination: ElementId,
    /// What the source does with the destination.
    pub description: String,
    /// Protocol or technology.
    pub technology: Option<String>,
    /// Tags, kept sorted.
    pub tags: BTreeSet<String>,
}

/// Identity of a relationship: (source name, destination name, description, technology).
///
/// Names rather than ids, so that re-declaring the same edge from another
/// model file collapses onto the existing relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipKey {
    /// Source display name.
    pub source: String,
    /// Destination display name.
    pub destination: String,
    /// Description.
    pub description: String,
    /// Technology.
    pub technology: Option<String>,
}

/// Description, technology and tags for a new relationship.
///
/// Built with [`RelationshipSpec::new`] and the chained setters:
///
/// ```
/// use archdiag_core::RelationshipSpec;
///
/// let spec = RelationshipSpec::new("Reads/Writes").technology("SQL").tag("sync");
/// assert_eq!(spec.technology.as_deref(), Some("SQL"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipSpec {
    /// Description (must be non-empty for [`crate::Model::relate`]).
    pub description: String,
    /// Technology.
    pub technology: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
}

impl RelationshipSpec {
    /// Creates a spec with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Sets the technology.
    #[must_use]
    pub fn technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = Some(technology.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}
