//! Selecting view specs by name, tag or module.

use std::collections::BTreeSet;

use crate::names::normalize;

use super::ViewSpec;

/// Selection criteria. Empty criteria select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// View keys or names; glob wildcards (`Payments*`) are allowed.
    pub names: Vec<String>,
    /// Tags; a spec is selected when any of its tags is listed.
    pub tags: BTreeSet<String>,
    /// Modules (first subject segment), compared normalised.
    pub modules: BTreeSet<String>,
}

impl Selection {
    /// Selects everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds a name or glob pattern.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Adds a module.
    #[must_use]
    pub fn module(mut self, module: &str) -> Self {
        self.modules.insert(normalize(module));
        self
    }

    /// Whether no criteria are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.tags.is_empty() && self.modules.is_empty()
    }

    /// Whether `spec` satisfies any criterion.
    #[must_use]
    pub fn matches(&self, spec: &ViewSpec) -> bool {
        if self.is_empty() {
            return true;
        }
        if self
            .names
            .iter()
            .any(|pattern| name_matches(pattern, &spec.key) || name_matches(pattern, &spec.name))
        {
            return true;
        }
        if spec.tags.iter().any(|t| self.tags.contains(t)) {
            return true;
        }
        let modules: BTreeSet<String> = self.modules.iter().map(|m| normalize(m)).collect();
        spec.module().is_some_and(|m| modules.contains(&m))
    }
}

/// Returns the specs matching `selection`, in their original order.
#[must_use]
pub fn select_views<'a>(specs: &'a [ViewSpec], selection: &Selection) -> Vec<&'a ViewSpec> {
    specs.iter().filter(|s| selection.matches(s)).collect()
}

/// Sorted, unique modules of all specs.
#[must_use]
pub fn list_modules(specs: &[ViewSpec]) -> Vec<String> {
    specs
        .iter()
        .filter_map(ViewSpec::module)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn name_matches(pattern: &str, candidate: &str) -> bool {
    if pattern == candidate {
        return true;
    }
    if !pattern.contains(['*', '?', '[']) {
        return false;
    }
    glob::Pattern::new(pattern).is_ok_and(|p| p.matches(candidate))
}
