//! Views: built diagrams attached to a model, and the declarative specs they
//! are built from.

mod filter;
mod merge;
mod resolve;
mod select;
mod spec;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ElementId;

pub use filter::{FilterKind, NameFilter, RelationshipFilter};
pub use merge::merge_specs;
pub use select::{list_modules, select_views, Selection};
pub use spec::{Query, Selector, ViewSpec};

/// Diagram kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViewType {
    /// All people and systems.
    SystemLandscape,
    /// One system and its surroundings.
    SystemContext,
    /// Containers of one system.
    Container,
    /// Components of one container.
    Component,
    /// Deployment nodes.
    Deployment,
}

impl ViewType {
    /// Canonical string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SystemLandscape => "SystemLandscape",
            Self::SystemContext => "SystemContext",
            Self::Container => "Container",
            Self::Component => "Component",
            Self::Deployment => "Deployment",
        }
    }

    /// Keyword opening the view block in the DSL.
    #[must_use]
    pub fn dsl_keyword(self) -> &'static str {
        match self {
            Self::SystemLandscape => "systemLandscape",
            Self::SystemContext => "systemContext",
            Self::Container => "container",
            Self::Component => "component",
            Self::Deployment => "deployment",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised view type string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view type '{0}' (expected SystemLandscape, SystemContext, Container, Component or Deployment)")]
pub struct ParseViewTypeError(pub String);

impl FromStr for ViewType {
    type Err = ParseViewTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "systemlandscape" | "landscape" => Ok(Self::SystemLandscape),
            "systemcontext" | "context" => Ok(Self::SystemContext),
            "container" => Ok(Self::Container),
            "component" => Ok(Self::Component),
            "deployment" => Ok(Self::Deployment),
            _ => Err(ParseViewTypeError(s.to_string())),
        }
    }
}

/// A view attached to a model.
///
/// Element includes are ids; name-based filters and element excludes stay as
/// names and are resolved by the exporter against emitted declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// Unique key.
    pub key: String,
    /// Display title.
    pub name: String,
    /// Diagram kind.
    pub view_type: ViewType,
    /// Description.
    pub description: String,
    /// Smart landscape: wildcard unless curated.
    pub smart: bool,
    /// System (context, container views) or container (component views).
    pub subject: Option<ElementId>,
    /// Included elements in insertion order, without duplicates.
    pub includes: Vec<ElementId>,
    /// Id-based relationship filters.
    pub relationship_filters: Vec<RelationshipFilter>,
    /// Name-based relationship filters.
    pub name_filters: Vec<NameFilter>,
    /// Element names to exclude.
    pub element_excludes: Vec<String>,
}

impl View {
    /// Creates an empty view.
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>, view_type: ViewType) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            view_type,
            description: String::new(),
            smart: false,
            subject: None,
            includes: Vec::new(),
            relationship_filters: Vec::new(),
            name_filters: Vec::new(),
            element_excludes: Vec::new(),
        }
    }

    /// Adds an element include; repeated ids are ignored.
    pub fn include(&mut self, id: ElementId) {
        if !self.includes.contains(&id) {
            self.includes.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_type_parses_loose_forms() {
        assert_eq!("SystemLandscape".parse::<ViewType>().unwrap(), ViewType::SystemLandscape);
        assert_eq!("system_context".parse::<ViewType>().unwrap(), ViewType::SystemContext);
        assert_eq!("Container".parse::<ViewType>().unwrap(), ViewType::Container);
        assert!("Dynamic".parse::<ViewType>().is_err());
    }

    #[test]
    fn include_ignores_duplicates() {
        let mut v = View::new("k", "K", ViewType::SystemLandscape);
        let id: ElementId = serde_json::from_str("\"core\"").unwrap();
        v.include(id.clone());
        v.include(id);
        assert_eq!(v.includes.len(), 1);
    }
}
