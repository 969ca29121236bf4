//! Relationship filters attached to views.
//!
//! Two flavours exist. [`RelationshipFilter`] refers to elements by id and is
//! produced by selectors; [`NameFilter`] refers to elements by display name and
//! is resolved against the emitted declarations at export time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ElementId;

/// Whether a filter adds or removes relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// `include a->b`
    Include,
    /// `exclude a->b`
    Exclude,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => f.write_str("include"),
            Self::Exclude => f.write_str("exclude"),
        }
    }
}

/// Filter on relationships by endpoint element; `None` stands for `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipFilter {
    /// Include or exclude.
    pub kind: FilterKind,
    /// Source endpoint.
    pub from: Option<ElementId>,
    /// Destination endpoint.
    pub to: Option<ElementId>,
    /// For excludes: elements whose edges with the fixed endpoint are re-included.
    pub but_include: Vec<ElementId>,
}

impl RelationshipFilter {
    /// `include from->to`.
    #[must_use]
    pub fn include(from: Option<ElementId>, to: Option<ElementId>) -> Self {
        Self {
            kind: FilterKind::Include,
            from,
            to,
            but_include: Vec::new(),
        }
    }

    /// `exclude from->to`, re-including edges to or from `but_include`.
    #[must_use]
    pub fn exclude(
        from: Option<ElementId>,
        to: Option<ElementId>,
        but_include: Vec<ElementId>,
    ) -> Self {
        Self {
            kind: FilterKind::Exclude,
            from,
            to,
            but_include,
        }
    }

    /// Elements this filter names.
    pub fn endpoints(&self) -> impl Iterator<Item = &ElementId> {
        self.from
            .iter()
            .chain(self.to.iter())
            .chain(self.but_include.iter())
    }
}

/// Filter on relationships by display name; `None` or `"*"` stands for any.
///
/// Names may use the `System/Container` form to pick a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NameFilter {
    /// Include relationships between the named elements.
    Include {
        /// Source name.
        #[serde(default)]
        from: Option<String>,
        /// Destination name.
        #[serde(default)]
        to: Option<String>,
    },
    /// Exclude relationships between the named elements.
    Exclude {
        /// Source name.
        #[serde(default)]
        from: Option<String>,
        /// Destination name.
        #[serde(default)]
        to: Option<String>,
        /// Names whose edges with the fixed endpoint are re-included.
        #[serde(default)]
        but_include: Vec<String>,
    },
}

impl NameFilter {
    /// Include filter.
    #[must_use]
    pub fn include(from: Option<&str>, to: Option<&str>) -> Self {
        Self::Include {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }

    /// Exclude filter with but-include names.
    #[must_use]
    pub fn exclude(from: Option<&str>, to: Option<&str>, but_include: &[&str]) -> Self {
        Self::Exclude {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            but_include: but_include.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Include or exclude.
    #[must_use]
    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Include { .. } => FilterKind::Include,
            Self::Exclude { .. } => FilterKind::Exclude,
        }
    }

    /// Source name, `None` when wildcard.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        let (Self::Include { from, .. } | Self::Exclude { from, .. }) = self;
        from.as_deref().filter(|s| !is_wildcard(s))
    }

    /// Destination name, `None` when wildcard.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        let (Self::Include { to, .. } | Self::Exclude { to, .. }) = self;
        to.as_deref().filter(|s| !is_wildcard(s))
    }

    /// But-include names (always empty for includes).
    #[must_use]
    pub fn but_include(&self) -> &[String] {
        match self {
            Self::Include { .. } => &[],
            Self::Exclude { but_include, .. } => but_include,
        }
    }
}

fn is_wildcard(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name == "*"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_and_empty_are_wildcards() {
        let f = NameFilter::include(Some("*"), Some(" "));
        assert_eq!(f.from(), None);
        assert_eq!(f.to(), None);
        let f = NameFilter::exclude(Some("Core"), None, &["Ledger"]);
        assert_eq!(f.from(), Some("Core"));
        assert_eq!(f.but_include(), &["Ledger".to_string()]);
        assert_eq!(f.kind(), FilterKind::Exclude);
    }

    #[test]
    fn name_filter_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            filters: Vec<NameFilter>,
        }
        let w: Wrapper = toml::from_str(
            r#"
            [[filters]]
            kind = "exclude"
            from = "Payments"
            but_include = ["Ledger"]

            [[filters]]
            kind = "include"
            to = "Core/API"
            "#,
        )
        .unwrap();
        assert_eq!(w.filters[0], NameFilter::exclude(Some("Payments"), None, &["Ledger"]));
        assert_eq!(w.filters[1], NameFilter::include(None, Some("Core/API")));
    }
}
