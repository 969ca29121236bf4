//! Lowering a model and its views into a [`Document`].

use std::collections::{HashMap, HashSet};

use crate::model::{Element, ElementId, ElementKind, ElementStyle, Model, RelationshipStyle};
use crate::names::identifier;
use crate::view::{FilterKind, RelationshipFilter, View, ViewType};

use super::document::{
    DeclKind, Declaration, Document, Endpoint, GroupBlock, ModelItem, RelationshipLine,
    StyleEntry, StylesBlock, ViewBlock, ViewLine,
};

/// Allocates DSL variables, suffixing `_2`, `_3`, … on collision.
#[derive(Debug, Default)]
struct VarAllocator {
    taken: HashSet<String>,
}

impl VarAllocator {
    fn allocate(&mut self, name: &str) -> String {
        let base = identifier(name);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Dedup key: kind plus the display-name chain from the system down.
type DeclKey = (DeclKind, Vec<String>);

struct Lowering<'m> {
    model: &'m Model,
    vars: VarAllocator,
    var_of: HashMap<ElementId, String>,
    by_key: HashMap<DeclKey, String>,
}

/// Lowers `model` and its built views into a document tree.
#[must_use]
pub fn lower(model: &Model) -> Document {
    let mut lowering = Lowering {
        model,
        vars: VarAllocator::default(),
        var_of: HashMap::new(),
        by_key: HashMap::new(),
    };
    let mut doc = Document {
        workspace_name: model.name().to_string(),
        ..Document::default()
    };

    lowering.lower_elements(&mut doc.model.items);
    lowering.lower_relationships(&mut doc.model.items);
    doc.views.views = lowering.lower_views();
    doc.views.styles = lower_styles(&model.styles().elements, &model.styles().relationships);
    doc.views.themes.clone_from(&model.styles().themes);

    tracing::debug!(
        "Lowered {} declarations and {} views",
        lowering.var_of.len(),
        doc.views.views.len()
    );
    doc
}

impl Lowering<'_> {
    // ────────────────────────────────────────────
    // Elements
    // ────────────────────────────────────────────

    fn lower_elements(&mut self, items: &mut Vec<ModelItem>) {
        let model = self.model;
        for person in model.people() {
            self.declare(items, person, DeclKind::Person, vec![person.name.clone()]);
        }

        let mut group_slot: HashMap<&str, usize> = HashMap::new();
        for system in model.software_systems() {
            let key = vec![system.name.clone()];
            let Some(group) = model.group_of(&system.id) else {
                self.declare(items, system, DeclKind::SoftwareSystem, key);
                self.lower_children(items, system);
                continue;
            };
            let slot = *group_slot.entry(group).or_insert_with(|| {
                items.push(ModelItem::Group(GroupBlock {
                    name: group.to_string(),
                    items: Vec::new(),
                }));
                items.len() - 1
            });
            if let ModelItem::Group(block) = &mut items[slot] {
                self.declare(&mut block.items, system, DeclKind::SoftwareSystem, key);
                self.lower_children(&mut block.items, system);
            }
        }
    }

    fn lower_children(&mut self, items: &mut Vec<ModelItem>, system: &Element) {
        let model = self.model;
        let Some(system_var) = self.var_of.get(&system.id).cloned() else {
            return;
        };
        for container in model.children_of(&system.id, ElementKind::Container) {
            let key = vec![system.name.clone(), container.name.clone()];
            let Some(parent) = find_declaration(items, &system_var) else {
                return;
            };
            self.declare(&mut parent.items, container, DeclKind::Container, key.clone());
            let Some(container_var) = self.var_of.get(&container.id).cloned() else {
                continue;
            };
            for component in model.children_of(&container.id, ElementKind::Component) {
                let mut key = key.clone();
                key.push(component.name.clone());
                if let Some(parent) = find_declaration(items, &container_var) {
                    self.declare(&mut parent.items, component, DeclKind::Component, key);
                }
            }
        }
    }

    /// Emits a declaration, or merges into the one already emitted for `key`.
    fn declare(
        &mut self,
        items: &mut Vec<ModelItem>,
        element: &Element,
        kind: DeclKind,
        names: Vec<String>,
    ) {
        let key = (kind, names);
        if let Some(var) = self.by_key.get(&key).cloned() {
            if let Some(existing) = find_declaration(items, &var) {
                absorb(existing, element);
            }
            self.var_of.insert(element.id.clone(), var);
            return;
        }
        let var = self.vars.allocate(&element.name);
        items.push(ModelItem::Declaration(Declaration {
            var: var.clone(),
            kind,
            name: element.name.clone(),
            description: element.description.clone(),
            technology: element.technology.clone().filter(|t| !t.is_empty()),
            tags: element.tags.iter().cloned().collect(),
            items: Vec::new(),
        }));
        self.by_key.insert(key, var.clone());
        self.var_of.insert(element.id.clone(), var);
    }

    // ────────────────────────────────────────────
    // Relationships
    // ────────────────────────────────────────────

    fn lower_relationships(&self, items: &mut [ModelItem]) {
        let mut seen: HashSet<(String, String, String, Option<String>)> = HashSet::new();
        let mut aggregated: Vec<RelationshipLine> = Vec::new();
        let aggregate = self
            .model
            .views()
            .iter()
            .any(|v| v.view_type == ViewType::SystemLandscape);

        let relationships = self.model.effective_relationships();
        for rel in &relationships {
            let (Some(src), Some(dst)) = (self.var_of.get(&rel.source), self.var_of.get(&rel.destination))
            else {
                continue;
            };
            let identity = (src.clone(), dst.clone(), rel.description.clone(), rel.technology.clone());
            if !seen.insert(identity) {
                continue;
            }
            let line = RelationshipLine {
                source: src.clone(),
                destination: dst.clone(),
                description: rel.description.clone(),
                technology: rel.technology.clone().filter(|t| !t.is_empty()),
                tags: rel.tags.iter().cloned().collect(),
            };
            match find_declaration(items, src) {
                Some(decl) => decl.items.push(ModelItem::Relationship(line)),
                None => tracing::debug!("No declaration for '{src}', relationship dropped"),
            }
        }

        if !aggregate {
            return;
        }
        // Only container and component endpoints lift to their systems.
        let mut emitted: HashSet<(String, String)> = HashSet::new();
        for rel in &relationships {
            let (Some(src_sys), Some(dst_sys)) = (
                self.model.parent_system(&rel.source),
                self.model.parent_system(&rel.destination),
            ) else {
                continue;
            };
            if src_sys == dst_sys {
                continue;
            }
            let (Some(a), Some(b)) = (self.var_of.get(src_sys), self.var_of.get(dst_sys)) else {
                continue;
            };
            let pair = (a.clone(), b.clone());
            if !emitted.insert(pair) {
                continue;
            }
            aggregated.push(RelationshipLine {
                source: a.clone(),
                destination: b.clone(),
                description: String::new(),
                technology: None,
                tags: Vec::new(),
            });
        }
        for line in aggregated {
            if let Some(decl) = find_declaration(items, &line.source) {
                decl.items.push(ModelItem::Relationship(line));
            }
        }
    }

    // ────────────────────────────────────────────
    // Views
    // ────────────────────────────────────────────

    fn lower_views(&self) -> Vec<ViewBlock> {
        let (smart, plain): (Vec<&View>, Vec<&View>) = self
            .model
            .views()
            .iter()
            .filter(|v| v.view_type != ViewType::Deployment)
            .partition(|v| v.smart);
        plain
            .into_iter()
            .chain(smart)
            .filter_map(|v| self.lower_view(v))
            .collect()
    }

    fn lower_view(&self, view: &View) -> Option<ViewBlock> {
        let subject = match &view.subject {
            Some(id) => Some(self.var_of.get(id).cloned()?),
            None if view.view_type == ViewType::SystemLandscape => None,
            None => {
                tracing::warn!("View '{}' has no subject, skipped", view.key);
                return None;
            }
        };
        let mut block = ViewBlock {
            kind: view.view_type,
            subject,
            key: view.key.clone(),
            name: view.name.clone(),
            description: view.description.clone(),
            smart: view.smart,
            lines: Vec::new(),
            name_filters: view.name_filters.clone(),
            element_excludes: view.element_excludes.clone(),
            curated: false,
        };

        let mut included: Vec<&ElementId> = view.includes.iter().collect();
        if view.smart {
            included.sort_by_cached_key(|id| {
                self.model
                    .element(id)
                    .map(|e| e.name.to_lowercase().replace(' ', "_"))
                    .unwrap_or_default()
            });
        }
        let includes: Vec<&String> = included
            .into_iter()
            .filter_map(|id| self.var_of.get(id))
            .collect();
        if view.smart && includes.is_empty() {
            block.lines.push(ViewLine::IncludeAll);
        }
        for var in includes {
            block.push_unique(ViewLine::Include(var.clone()));
        }
        for filter in &view.relationship_filters {
            self.lower_filter(&mut block, filter);
        }
        Some(block)
    }

    fn lower_filter(&self, block: &mut ViewBlock, filter: &RelationshipFilter) {
        let endpoint = |id: &Option<ElementId>| match id {
            None => Some(Endpoint::Any),
            Some(id) => self.var_of.get(id).cloned().map(Endpoint::Var),
        };
        let (Some(from), Some(to)) = (endpoint(&filter.from), endpoint(&filter.to)) else {
            return;
        };
        let line = match filter.kind {
            FilterKind::Include => ViewLine::IncludeRel(from.clone(), to.clone()),
            FilterKind::Exclude => ViewLine::ExcludeRel(from.clone(), to.clone()),
        };
        block.push_unique(line);
        if filter.kind == FilterKind::Exclude {
            for id in &filter.but_include {
                let Some(var) = self.var_of.get(id) else {
                    continue;
                };
                let line = if from == Endpoint::Any {
                    ViewLine::IncludeRel(Endpoint::Var(var.clone()), to.clone())
                } else {
                    ViewLine::IncludeRel(from.clone(), Endpoint::Var(var.clone()))
                };
                block.push_unique(line);
            }
        }
    }
}

fn absorb(existing: &mut Declaration, element: &Element) {
    if existing.description.is_empty() && !element.description.is_empty() {
        existing.description.clone_from(&element.description);
    }
    if existing.technology.is_none() {
        existing.technology = element.technology.clone().filter(|t| !t.is_empty());
    }
    for tag in &element.tags {
        if !existing.tags.contains(tag) {
            existing.tags.push(tag.clone());
        }
    }
    existing.tags.sort();
}

/// Finds a declaration by variable anywhere below `items`.
pub(crate) fn find_declaration<'a>(
    items: &'a mut [ModelItem],
    var: &str,
) -> Option<&'a mut Declaration> {
    for item in items {
        match item {
            ModelItem::Declaration(decl) => {
                if decl.var == var {
                    return Some(decl);
                }
                if let Some(found) = find_declaration(&mut decl.items, var) {
                    return Some(found);
                }
            }
            ModelItem::Group(group) => {
                if let Some(found) = find_declaration(&mut group.items, var) {
                    return Some(found);
                }
            }
            ModelItem::Relationship(_) => {}
        }
    }
    None
}

fn lower_styles(
    elements: &[ElementStyle],
    relationships: &[RelationshipStyle],
) -> Option<StylesBlock> {
    if elements.is_empty() && relationships.is_empty() {
        return None;
    }
    let elements = elements
        .iter()
        .map(|style| {
            let mut attributes = Vec::new();
            let mut push = |k: &str, v: Option<String>| {
                if let Some(v) = v {
                    attributes.push((k.to_string(), v));
                }
            };
            push("background", style.background.clone());
            push("color", style.color.clone());
            push("shape", style.shape.clone());
            push("opacity", style.opacity.map(|o| o.to_string()));
            StyleEntry {
                tag: style.tag.clone(),
                attributes,
            }
        })
        .collect();
    let relationships = relationships
        .iter()
        .map(|style| {
            let mut attributes = Vec::new();
            if let Some(color) = &style.color {
                attributes.push(("color".to_string(), color.clone()));
            }
            if let Some(dashed) = style.dashed {
                attributes.push(("dashed".to_string(), dashed.to_string()));
            }
            if let Some(thickness) = style.thickness {
                attributes.push(("thickness".to_string(), thickness.to_string()));
            }
            StyleEntry {
                tag: style.tag.clone(),
                attributes,
            }
        })
        .collect();
    Some(StylesBlock {
        elements,
        relationships,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationshipSpec;
    use crate::view::ViewSpec;

    #[test]
    fn allocator_suffixes_collisions() {
        let mut vars = VarAllocator::default();
        assert_eq!(vars.allocate("Payments"), "payments");
        assert_eq!(vars.allocate("payments"), "payments_2");
        assert_eq!(vars.allocate("Payments!"), "payments_3");
    }

    #[test]
    fn people_with_the_same_name_collapse() {
        let mut m = Model::new("T", "");
        let a = m.add_person("Alice", "");
        let b = m.add_person("Alice", "Analyst");
        m.add_tags(&b, ["staff"]).unwrap();
        let doc = lower(&m);
        let decls = doc.declarations();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].0.description, "Analyst");
        assert_eq!(decls[0].0.tags, vec!["staff"]);
        assert_ne!(a, b);
    }

    #[test]
    fn containers_nest_under_their_system() {
        let mut m = Model::new("T", "");
        let s = m.add_software_system("Core", "");
        let api = m.add_container(&s, "API", "", Some("Rust")).unwrap();
        m.add_component(&api, "Router", "", None).unwrap();
        let doc = lower(&m);
        let decls = doc.declarations();
        let names: Vec<(&str, Option<&str>)> = decls
            .iter()
            .map(|(d, p)| (d.var.as_str(), p.map(|p| p.var.as_str())))
            .collect();
        assert_eq!(
            names,
            vec![("core", None), ("api", Some("core")), ("router", Some("api"))]
        );
    }

    #[test]
    fn landscape_views_get_aggregated_system_edges_once() {
        let mut m = Model::new("T", "");
        let a = m.add_software_system("A", "");
        let b = m.add_software_system("B", "");
        m.add_container(&a, "A1", "", None).unwrap();
        m.add_container(&a, "A2", "", None).unwrap();
        m.add_container(&b, "B1", "", None).unwrap();
        m.relate("A/A1", "B/B1", RelationshipSpec::new("reads")).unwrap();
        m.relate("A/A2", "B/B1", RelationshipSpec::new("writes")).unwrap();
        ViewSpec::new("L", "L", ViewType::SystemLandscape)
            .include("A")
            .build(&mut m)
            .unwrap();
        let doc = lower(&m);
        let aggregated: Vec<_> = doc
            .relationships()
            .into_iter()
            .filter(|r| r.source == "a" && r.destination == "b")
            .collect();
        assert_eq!(aggregated.len(), 1);
        assert!(aggregated[0].description.is_empty());
    }

    #[test]
    fn smart_views_follow_plain_views_in_declaration_order() {
        let mut m = Model::new("T", "");
        m.add_software_system("A", "");
        ViewSpec::new("Z", "Zeta", ViewType::SystemLandscape)
            .smart(true)
            .build(&mut m)
            .unwrap();
        ViewSpec::new("S", "Alpha Smart", ViewType::SystemLandscape)
            .smart(true)
            .build(&mut m)
            .unwrap();
        ViewSpec::new("P", "Plain", ViewType::SystemLandscape)
            .include("A")
            .build(&mut m)
            .unwrap();
        let doc = lower(&m);
        let keys: Vec<&str> = doc.views.views.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["P", "Z", "S"]);
        assert_eq!(doc.views.views[1].lines, vec![ViewLine::IncludeAll]);
    }

    #[test]
    fn smart_view_includes_sort_by_name() {
        let mut m = Model::new("T", "");
        m.add_software_system("Zulu", "");
        m.add_software_system("alpha", "");
        m.add_software_system("Mike Lima", "");
        ViewSpec::new("S", "Smart", ViewType::SystemLandscape)
            .smart(true)
            .include("Zulu")
            .include("Mike Lima")
            .include("alpha")
            .build(&mut m)
            .unwrap();
        let doc = lower(&m);
        assert_eq!(
            doc.views.views[0].lines,
            vec![
                ViewLine::Include("alpha".into()),
                ViewLine::Include("mike_lima".into()),
                ViewLine::Include("zulu".into()),
            ]
        );
    }

    #[test]
    fn aggregation_lifts_only_nested_endpoints() {
        let mut m = Model::new("T", "");
        let a = m.add_software_system("A", "");
        let b = m.add_software_system("B", "");
        m.add_container(&a, "A1", "", None).unwrap();
        m.add_container(&b, "B1", "", None).unwrap();
        m.relate("A/A1", "B", RelationshipSpec::new("calls")).unwrap();
        m.relate("A", "B", RelationshipSpec::new("depends on")).unwrap();
        m.relate("A/A1", "B/B1", RelationshipSpec::new("reads")).unwrap();
        ViewSpec::new("L", "L", ViewType::SystemLandscape)
            .include("A")
            .build(&mut m)
            .unwrap();
        let doc = lower(&m);
        let a_to_b: Vec<&str> = doc
            .relationships()
            .into_iter()
            .filter(|r| r.source == "a" && r.destination == "b")
            .map(|r| r.description.as_str())
            .collect();
        assert_eq!(a_to_b, vec!["depends on", ""]);
    }

    #[test]
    fn but_include_expands_against_the_fixed_endpoint() {
        let mut m = Model::new("T", "");
        let a = m.add_software_system("A", "");
        let b = m.add_software_system("B", "");
        ViewSpec::new("L", "L", ViewType::SystemLandscape)
            .smart(true)
            .exclude(RelationshipFilter::exclude(Some(a), None, vec![b]))
            .build(&mut m)
            .unwrap();
        let doc = lower(&m);
        assert_eq!(
            doc.views.views[0].lines,
            vec![
                ViewLine::IncludeAll,
                ViewLine::ExcludeRel(Endpoint::Var("a".into()), Endpoint::Any),
                ViewLine::IncludeRel(Endpoint::Var("a".into()), Endpoint::Var("b".into())),
            ]
        );
    }
}
