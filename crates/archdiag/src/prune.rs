//! Pruning a model down to what its views reference.

use std::collections::HashSet;

use archdiag_core::{ElementId, Model};

/// Removes every person, system and container the model's views do not
/// reference.
///
/// Kept: view includes, view subjects, relationship filter endpoints and
/// elements named by name filters, plus the parents of all of these.
/// Relationships survive only between kept elements.
pub fn prune_to_views(model: &mut Model) {
    let mut keep: HashSet<ElementId> = HashSet::new();
    for view in model.views() {
        keep.extend(view.subject.iter().cloned());
        keep.extend(view.includes.iter().cloned());
        for filter in &view.relationship_filters {
            keep.extend(filter.endpoints().cloned());
        }
        for filter in &view.name_filters {
            let names = filter
                .from()
                .into_iter()
                .chain(filter.to())
                .chain(filter.but_include().iter().map(String::as_str));
            keep.extend(names.filter_map(|name| resolve_name(model, name)));
        }
    }

    let parents: Vec<ElementId> = keep
        .iter()
        .flat_map(|id| ancestors(model, id))
        .collect();
    keep.extend(parents);

    let before = model.iter_elements().count();
    let relationships_before = model.relationships().len();
    model.retain(&keep);
    tracing::debug!(
        "Pruned {} element(s) and {} relationship(s) not referenced by views",
        before.saturating_sub(model.iter_elements().count()),
        relationships_before.saturating_sub(model.relationships().len())
    );
}

/// Element for a name filter endpoint: a lookup key, or a bare person name.
fn resolve_name(model: &Model, name: &str) -> Option<ElementId> {
    let name = name.trim();
    if name.is_empty() || name == "*" {
        return None;
    }
    model.get(name).or_else(|_| model.get_person(name)).ok()
}

fn ancestors(model: &Model, id: &ElementId) -> Vec<ElementId> {
    let mut out = Vec::new();
    let mut current = model.element(id).and_then(|e| e.parent.clone());
    while let Some(parent) = current {
        current = model.element(&parent).and_then(|e| e.parent.clone());
        out.push(parent);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use archdiag_core::{NameFilter, RelationshipSpec, ViewSpec, ViewType};

    fn bank() -> Model {
        let mut m = Model::new("Bank", "");
        m.add_person("Customer", "");
        m.add_person("Auditor", "");
        let portal = m.add_software_system("Portal", "");
        m.add_container(&portal, "Web", "", None).unwrap();
        m.add_container(&portal, "Api", "", None).unwrap();
        let core = m.add_software_system("Core", "");
        m.add_container(&core, "Ledger", "", None).unwrap();
        m.add_software_system("Reporting", "");
        m.relate("person:Customer", "Portal", RelationshipSpec::new("uses"))
            .unwrap();
        m.relate("Portal/Api", "Core/Ledger", RelationshipSpec::new("posts"))
            .unwrap();
        m.relate("person:Auditor", "Reporting", RelationshipSpec::new("reads"))
            .unwrap();
        m
    }

    #[test]
    fn keeps_included_elements_and_drops_the_rest() {
        let mut m = bank();
        ViewSpec::new("L", "L", ViewType::SystemLandscape)
            .include("person:Customer")
            .include("Portal")
            .build(&mut m)
            .unwrap();
        prune_to_views(&mut m);

        assert!(m.contains("person:Customer"));
        assert!(m.contains("Portal"));
        assert!(!m.contains("person:Auditor"));
        assert!(!m.contains("Reporting"));
        assert!(!m.contains("Core"));
        assert!(!m.contains("Portal/Web"));
        assert_eq!(m.relationships().len(), 1);
    }

    #[test]
    fn container_subject_keeps_its_system() {
        let mut m = bank();
        ViewSpec::new("C", "C", ViewType::Component)
            .subject("Core/Ledger")
            .build(&mut m)
            .unwrap();
        prune_to_views(&mut m);

        assert!(m.contains("Core"));
        assert!(m.contains("Core/Ledger"));
        assert!(!m.contains("Portal"));
    }

    #[test]
    fn name_filter_endpoints_are_kept() {
        let mut m = bank();
        ViewSpec::new("C", "C", ViewType::Container)
            .subject("Portal")
            .include("Portal/Api")
            .filter(NameFilter::include(Some("Portal/Api"), Some("Core/Ledger")))
            .build(&mut m)
            .unwrap();
        prune_to_views(&mut m);

        assert!(m.contains("Core/Ledger"));
        assert!(m.contains("Core"));
        assert!(!m.contains("Portal/Web"));
        assert_eq!(m.relationships().len(), 1);
        assert_eq!(m.relationships()[0].description, "posts");
    }

    #[test]
    fn wildcard_and_unknown_names_resolve_to_nothing() {
        let m = bank();
        assert!(resolve_name(&m, "*").is_none());
        assert!(resolve_name(&m, "  ").is_none());
        assert!(resolve_name(&m, "Ghost").is_none());
        assert_eq!(resolve_name(&m, "Auditor"), m.get("person:Auditor").ok());
    }
}
