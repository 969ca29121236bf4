//! Index of emitted declarations, rebuilt from the document tree.

use std::collections::HashMap;

use crate::names::{normalize, split_path};

use super::document::{DeclKind, Document};

/// What the passes need to know about one declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeclInfo {
    pub var: String,
    pub kind: DeclKind,
    pub name: String,
    pub parent_system: Option<String>,
    pub parent_container: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct DeclIndex {
    entries: Vec<DeclInfo>,
    by_var: HashMap<String, usize>,
}

impl DeclIndex {
    pub(crate) fn build(doc: &Document) -> Self {
        let mut index = Self::default();
        let mut system_of: HashMap<&str, Option<String>> = HashMap::new();
        for (decl, parent) in doc.declarations() {
            let (parent_system, parent_container) = match (decl.kind, parent) {
                (DeclKind::Container, Some(p)) => (Some(p.var.clone()), None),
                (DeclKind::Component, Some(p)) => (
                    system_of.get(p.var.as_str()).cloned().flatten(),
                    Some(p.var.clone()),
                ),
                _ => (None, None),
            };
            system_of.insert(decl.var.as_str(), parent_system.clone());
            index.by_var.insert(decl.var.clone(), index.entries.len());
            index.entries.push(DeclInfo {
                var: decl.var.clone(),
                kind: decl.kind,
                name: decl.name.clone(),
                parent_system,
                parent_container,
            });
        }
        index
    }

    pub(crate) fn get(&self, var: &str) -> Option<&DeclInfo> {
        self.by_var.get(var).map(|&i| &self.entries[i])
    }

    pub(crate) fn contains(&self, var: &str) -> bool {
        self.by_var.contains_key(var)
    }

    /// Resolves a display name to a variable.
    ///
    /// `System/Container` picks a container whose parent system matches. A
    /// plain name prefers systems, then containers, components and people.
    pub(crate) fn resolve(&self, name: &str) -> Option<&str> {
        if let Some((system, container)) = split_path(name) {
            let (system, container) = (normalize(system), normalize(container));
            return self
                .entries
                .iter()
                .filter(|e| e.kind == DeclKind::Container && normalize(&e.name) == container)
                .find(|e| {
                    e.parent_system
                        .as_deref()
                        .and_then(|s| self.get(s))
                        .is_some_and(|s| normalize(&s.name) == system)
                })
                .map(|e| e.var.as_str());
        }
        let wanted = normalize(name);
        [
            DeclKind::SoftwareSystem,
            DeclKind::Container,
            DeclKind::Component,
            DeclKind::Person,
        ]
        .into_iter()
        .find_map(|kind| {
            self.entries
                .iter()
                .find(|e| e.kind == kind && normalize(&e.name) == wanted)
        })
        .map(|e| e.var.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::document::{Declaration, ModelItem};

    fn decl(var: &str, kind: DeclKind, name: &str, items: Vec<ModelItem>) -> ModelItem {
        ModelItem::Declaration(Declaration {
            var: var.into(),
            kind,
            name: name.into(),
            description: String::new(),
            technology: None,
            tags: Vec::new(),
            items,
        })
    }

    fn doc() -> Document {
        let mut d = Document::default();
        d.model.items = vec![
            decl("api", DeclKind::Person, "API", vec![]),
            decl(
                "core_banking",
                DeclKind::SoftwareSystem,
                "Core Banking",
                vec![decl(
                    "ledger",
                    DeclKind::Container,
                    "Ledger Service",
                    vec![decl("posting", DeclKind::Component, "Posting", vec![])],
                )],
            ),
            decl("payments", DeclKind::SoftwareSystem, "Payments", vec![
                decl("api_2", DeclKind::Container, "API", vec![]),
            ]),
        ];
        d
    }

    #[test]
    fn parents_are_tracked() {
        let index = DeclIndex::build(&doc());
        let posting = index.get("posting").unwrap();
        assert_eq!(posting.parent_container.as_deref(), Some("ledger"));
        assert_eq!(posting.parent_system.as_deref(), Some("core_banking"));
    }

    #[test]
    fn path_resolution_requires_matching_system() {
        let index = DeclIndex::build(&doc());
        assert_eq!(index.resolve("core_banking/ledger service"), Some("ledger"));
        assert_eq!(index.resolve("Payments/Ledger Service"), None);
    }

    #[test]
    fn plain_names_rank_systems_first_then_containers() {
        let index = DeclIndex::build(&doc());
        assert_eq!(index.resolve(" Core_Banking "), Some("core_banking"));
        assert_eq!(index.resolve("API"), Some("api_2"));
        assert_eq!(index.resolve("Nope"), None);
    }
}
