//! User-declared visual styles, keyed by tag.

use serde::{Deserialize, Serialize};

/// Visual attributes for elements carrying `tag`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Tag the style applies to.
    pub tag: String,
    /// Background colour, e.g. `#1168bd`.
    #[serde(default)]
    pub background: Option<String>,
    /// Foreground colour.
    #[serde(default)]
    pub color: Option<String>,
    /// Shape name, e.g. `Cylinder`.
    #[serde(default)]
    pub shape: Option<String>,
    /// Opacity percentage.
    #[serde(default)]
    pub opacity: Option<u8>,
}

/// Visual attributes for relationships carrying `tag`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipStyle {
    /// Tag the style applies to.
    pub tag: String,
    /// Line colour.
    #[serde(default)]
    pub color: Option<String>,
    /// Dashed line.
    #[serde(default)]
    pub dashed: Option<bool>,
    /// Line thickness.
    #[serde(default)]
    pub thickness: Option<u32>,
}

/// Ordered style lists plus theme URLs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Styles {
    /// Element styles in declaration order.
    pub elements: Vec<ElementStyle>,
    /// Relationship styles in declaration order.
    pub relationships: Vec<RelationshipStyle>,
    /// Theme URLs.
    pub themes: Vec<String>,
}

impl Styles {
    /// Returns `true` when nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.relationships.is_empty()
    }

    /// Appends an element style.
    pub fn add_element(&mut self, style: ElementStyle) {
        self.elements.push(style);
    }

    /// Appends a relationship style.
    pub fn add_relationship(&mut self, style: RelationshipStyle) {
        self.relationships.push(style);
    }
}
