//! Rewriting passes over the document tree.
//!
//! Each pass is idempotent: applying it twice yields the same tree as
//! applying it once. [`apply_all`] runs them in their fixed order.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::view::{FilterKind, NameFilter, ViewType};

use super::document::{
    DeclKind, Document, Endpoint, ModelItem, StyleEntry, StylesBlock, ViewBlock, ViewLine,
};
use super::index::DeclIndex;

/// Property key of the group separator.
pub const GROUP_SEPARATOR: &str = "structurizr.groupSeparator";

/// Runs every pass in order.
pub fn apply_all(doc: &mut Document) {
    ensure_group_separator(doc);
    inject_styles(doc);
    reorder_relationships(doc);
    canonicalize_suffixes(doc);
    inject_workspace_comment(doc);
    apply_name_filters(doc);
    normalize_includes(doc);
}

/// Ensures exactly one group-separator property, set to `/`.
pub fn ensure_group_separator(doc: &mut Document) {
    let mut seen = false;
    doc.model.properties.retain(|(key, _)| {
        if key != GROUP_SEPARATOR {
            return true;
        }
        !std::mem::replace(&mut seen, true)
    });
    if !seen {
        doc.model
            .properties
            .push((GROUP_SEPARATOR.to_string(), "/".to_string()));
    }
}

// ────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────

fn default_palette() -> Vec<StyleEntry> {
    vec![
        StyleEntry::new("Element", &[("shape", "RoundedBox")]),
        StyleEntry::new("Software System", &[("background", "#1168bd"), ("color", "#ffffff")]),
        StyleEntry::new("Container", &[("background", "#438dd5"), ("color", "#ffffff")]),
        StyleEntry::new("Component", &[("background", "#85bbf0"), ("color", "#000000")]),
        StyleEntry::new(
            "Person",
            &[("background", "#08427b"), ("color", "#ffffff"), ("shape", "Person")],
        ),
        StyleEntry::new("Infrastructure Node", &[("background", "#ffffff")]),
        StyleEntry::new("database", &[("shape", "Cylinder")]),
    ]
    .into_iter()
    .chain(baseline())
    .collect()
}

fn baseline() -> Vec<StyleEntry> {
    vec![
        StyleEntry::new("Container", &[("shape", "RoundedBox"), ("description", "true")]),
        StyleEntry::new("Person", &[("shape", "Person")]),
        StyleEntry::new("external", &[("background", "#808080")]),
        StyleEntry::new("storage", &[("shape", "Cylinder")]),
        StyleEntry::new("library", &[("shape", "Folder")]),
    ]
}

/// Synthesises the default palette when no styles exist, otherwise appends
/// the baseline entries whose tags are missing.
pub fn inject_styles(doc: &mut Document) {
    match doc.views.styles.as_mut() {
        None => {
            doc.views.styles = Some(StylesBlock {
                elements: default_palette(),
                relationships: Vec::new(),
            });
        }
        Some(block) => {
            for entry in baseline() {
                if !block.elements.iter().any(|e| e.tag == entry.tag) {
                    block.elements.push(entry);
                }
            }
        }
    }
}

// ────────────────────────────────────────────
// Model block
// ────────────────────────────────────────────

/// Moves every relationship to the end of the model block, keeping their
/// pre-order sequence.
pub fn reorder_relationships(doc: &mut Document) {
    let mut moved = Vec::new();
    take_relationships(&mut doc.model.items, &mut moved);
    doc.model.items.extend(moved);
}

fn take_relationships(items: &mut Vec<ModelItem>, out: &mut Vec<ModelItem>) {
    let mut kept = Vec::with_capacity(items.len());
    for mut item in items.drain(..) {
        match &mut item {
            ModelItem::Relationship(_) => {
                out.push(item);
                continue;
            }
            ModelItem::Declaration(decl) => take_relationships(&mut decl.items, out),
            ModelItem::Group(group) => take_relationships(&mut group.items, out),
        }
        kept.push(item);
    }
    *items = kept;
}

/// Renames `base_N` to `base` when `base` is free and `base_N` is the only
/// suffixed variant.
pub fn canonicalize_suffixes(doc: &mut Document) {
    let declared: HashSet<String> = doc
        .declarations()
        .iter()
        .map(|(d, _)| d.var.clone())
        .collect();
    let mut by_base: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for var in &declared {
        if let Some(base) = suffix_base(var) {
            by_base.entry(base.to_string()).or_default().push(var.clone());
        }
    }
    for (base, variants) in by_base {
        if declared.contains(&base) || variants.len() != 1 {
            continue;
        }
        tracing::debug!("Renaming '{}' to '{base}'", variants[0]);
        doc.rename_var(&variants[0], &base);
    }
}

fn suffix_base(var: &str) -> Option<&str> {
    let (base, suffix) = var.rsplit_once('_')?;
    let numeric = !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit());
    (numeric && !base.is_empty()).then_some(base)
}

/// Adds a `// name` header comment unless the workspace name already appears.
pub fn inject_workspace_comment(doc: &mut Document) {
    let name = doc.workspace_name.trim().to_string();
    if name.is_empty() || doc.mentions(&name) {
        return;
    }
    doc.comments.push(name);
}

// ────────────────────────────────────────────
// Views
// ────────────────────────────────────────────

/// Resolves element excludes and name filters into directives, then marks
/// the view as curated. Unresolvable names produce no directive.
pub fn apply_name_filters(doc: &mut Document) {
    let index = DeclIndex::build(doc);
    for view in &mut doc.views.views {
        if view.curated || (view.name_filters.is_empty() && view.element_excludes.is_empty()) {
            continue;
        }
        for name in &view.element_excludes {
            if let Some(var) = index.resolve(name) {
                view.lines.push(ViewLine::Exclude(var.to_string()));
            }
        }
        let filters = view.name_filters.clone();
        for filter in &filters {
            inject_filter(view, &index, filter);
        }
        view.curated = true;
    }
}

fn inject_filter(view: &mut ViewBlock, index: &DeclIndex, filter: &NameFilter) {
    let endpoint = |name: Option<&str>| match name {
        None => Some(Endpoint::Any),
        Some(name) => index.resolve(name).map(|v| Endpoint::Var(v.to_string())),
    };
    let (Some(from), Some(to)) = (endpoint(filter.from()), endpoint(filter.to())) else {
        tracing::debug!("View '{}': filter {filter:?} does not resolve, skipped", view.key);
        return;
    };
    match filter.kind() {
        FilterKind::Include => view.push_unique(ViewLine::IncludeRel(from, to)),
        FilterKind::Exclude => {
            view.push_unique(ViewLine::ExcludeRel(from.clone(), to.clone()));
            for name in filter.but_include() {
                let Some(var) = index.resolve(name).map(str::to_string) else {
                    continue;
                };
                let line = if from == Endpoint::Any {
                    ViewLine::IncludeRel(Endpoint::Var(var), to.clone())
                } else {
                    ViewLine::IncludeRel(from.clone(), Endpoint::Var(var))
                };
                view.push_unique(line);
            }
        }
    }
}

/// Maps subjects and includes onto what each view type can show, removes
/// duplicate includes, and curates relationships for uncurated views.
///
/// A non-landscape view without a wildcard gets `exclude *->*` followed by
/// sorted `include a->b` lines for relationships between its included
/// elements; one without any includes gets `include *` instead.
pub fn normalize_includes(doc: &mut Document) {
    let index = DeclIndex::build(doc);
    let pairs: BTreeSet<(String, String)> = doc
        .relationships()
        .iter()
        .map(|r| (r.source.clone(), r.destination.clone()))
        .collect();

    for view in &mut doc.views.views {
        normalize_subject(view, &index);
        remap_includes(view, &index);

        if view.kind == ViewType::SystemLandscape || view.curated || view.has_wildcard() {
            continue;
        }
        let included: HashSet<String> = view.included_vars().map(str::to_string).collect();
        if included.is_empty() {
            view.lines.push(ViewLine::IncludeAll);
            continue;
        }
        view.push_unique(ViewLine::ExcludeRel(Endpoint::Any, Endpoint::Any));
        for (source, destination) in &pairs {
            if included.contains(source) && included.contains(destination) {
                view.push_unique(ViewLine::IncludeRel(
                    Endpoint::Var(source.clone()),
                    Endpoint::Var(destination.clone()),
                ));
            }
        }
    }
}

fn normalize_subject(view: &mut ViewBlock, index: &DeclIndex) {
    let Some(info) = view.subject.as_deref().and_then(|s| index.get(s)) else {
        return;
    };
    let mapped = match (view.kind, info.kind) {
        (ViewType::SystemContext | ViewType::Container, DeclKind::Container | DeclKind::Component) => {
            info.parent_system.clone()
        }
        (ViewType::Component, DeclKind::Component) => info.parent_container.clone(),
        _ => None,
    };
    if let Some(mapped) = mapped {
        view.subject = Some(mapped);
    }
}

fn remap_includes(view: &mut ViewBlock, index: &DeclIndex) {
    let subject_system = view.subject.as_deref().and_then(|s| index.get(s)).and_then(|s| {
        match s.kind {
            DeclKind::SoftwareSystem => Some(s.var.clone()),
            _ => s.parent_system.clone(),
        }
    });
    let subject = view.subject.clone();
    let mut seen: HashSet<String> = HashSet::new();
    let lines = std::mem::take(&mut view.lines);
    for line in lines {
        let ViewLine::Include(var) = line else {
            view.lines.push(line);
            continue;
        };
        let target = index.get(&var).and_then(|info| match (view.kind, info.kind) {
            (
                ViewType::SystemLandscape | ViewType::SystemContext,
                DeclKind::Container | DeclKind::Component,
            ) => info.parent_system.clone(),
            (ViewType::Container, DeclKind::Component) => info.parent_system.clone(),
            (ViewType::Container, DeclKind::Container) => match (&info.parent_system, &subject_system) {
                (Some(own), Some(subject)) if own != subject => Some(own.clone()),
                _ => None,
            },
            (ViewType::Component, DeclKind::Component) => match (&info.parent_container, &subject) {
                (Some(own), Some(subject)) if own != subject => Some(own.clone()),
                _ => None,
            },
            _ => None,
        });
        let var = target.unwrap_or(var);
        if seen.insert(var.clone()) {
            view.lines.push(ViewLine::Include(var));
        }
    }
}
