//! Typed intermediate form of a Structurizr DSL workspace.
//!
//! Lowering produces this tree, the passes rewrite it, and rendering
//! serialises it once.

use crate::view::{NameFilter, ViewType};

/// A whole workspace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Logical workspace name, used by the name-comment pass.
    pub workspace_name: String,
    /// Comment lines emitted right after the `workspace {` header.
    pub comments: Vec<String>,
    /// The `model { }` block.
    pub model: ModelBlock,
    /// The `views { }` block.
    pub views: ViewsBlock,
}

/// The `model { }` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelBlock {
    /// `properties { }` entries.
    pub properties: Vec<(String, String)>,
    /// Declarations, groups and relationships.
    pub items: Vec<ModelItem>,
}

/// One statement inside the model block (or nested in a declaration).
#[derive(Debug, Clone, PartialEq)]
pub enum ModelItem {
    /// `var = kind "name" ...`
    Declaration(Declaration),
    /// `a -> b "description"`
    Relationship(RelationshipLine),
    /// `group "name" { ... }`
    Group(GroupBlock),
}

/// Declared element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclKind {
    /// `person`
    Person,
    /// `softwareSystem`
    SoftwareSystem,
    /// `container`
    Container,
    /// `component`
    Component,
}

impl DeclKind {
    /// DSL keyword.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::SoftwareSystem => "softwareSystem",
            Self::Container => "container",
            Self::Component => "component",
        }
    }

    /// Whether the DSL takes a technology argument for this kind.
    #[must_use]
    pub fn has_technology(self) -> bool {
        matches!(self, Self::Container | Self::Component)
    }
}

/// An element declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Variable name.
    pub var: String,
    /// Kind.
    pub kind: DeclKind,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Technology.
    pub technology: Option<String>,
    /// Tags, sorted.
    pub tags: Vec<String>,
    /// Nested statements.
    pub items: Vec<ModelItem>,
}

/// A relationship statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipLine {
    /// Source variable.
    pub source: String,
    /// Destination variable.
    pub destination: String,
    /// Description.
    pub description: String,
    /// Technology.
    pub technology: Option<String>,
    /// Tags, sorted.
    pub tags: Vec<String>,
}

/// A named group of declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBlock {
    /// Group name.
    pub name: String,
    /// Grouped statements.
    pub items: Vec<ModelItem>,
}

/// The `views { }` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewsBlock {
    /// View blocks in emission order.
    pub views: Vec<ViewBlock>,
    /// The `styles { }` block, if any.
    pub styles: Option<StylesBlock>,
    /// Theme URLs.
    pub themes: Vec<String>,
}

/// One view block.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewBlock {
    /// Diagram kind.
    pub kind: ViewType,
    /// Subject variable (absent for landscapes).
    pub subject: Option<String>,
    /// View key.
    pub key: String,
    /// View name (annotation and title).
    pub name: String,
    /// Description.
    pub description: String,
    /// Smart landscape.
    pub smart: bool,
    /// Include/exclude directives.
    pub lines: Vec<ViewLine>,
    /// Name filters awaiting resolution.
    pub name_filters: Vec<NameFilter>,
    /// Element names awaiting exclusion.
    pub element_excludes: Vec<String>,
    /// Set once name filters were injected; suppresses generic normalisation.
    pub curated: bool,
}

impl ViewBlock {
    /// Whether the block includes everything by wildcard.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.lines.contains(&ViewLine::IncludeAll)
    }

    /// Variables included as elements, in order.
    pub fn included_vars(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            ViewLine::Include(var) => Some(var.as_str()),
            _ => None,
        })
    }

    /// Appends a line unless an identical one is already present.
    pub fn push_unique(&mut self, line: ViewLine) {
        if !self.lines.contains(&line) {
            self.lines.push(line);
        }
    }
}

/// Relationship endpoint in a filter directive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Endpoint {
    /// `*`
    Any,
    /// A variable.
    Var(String),
}

/// One directive inside a view block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewLine {
    /// `include *`
    IncludeAll,
    /// `include var`
    Include(String),
    /// `exclude var`
    Exclude(String),
    /// `include a->b`
    IncludeRel(Endpoint, Endpoint),
    /// `exclude a->b`
    ExcludeRel(Endpoint, Endpoint),
}

/// The `styles { }` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylesBlock {
    /// `element "tag" { }` entries.
    pub elements: Vec<StyleEntry>,
    /// `relationship "tag" { }` entries.
    pub relationships: Vec<StyleEntry>,
}

/// One style entry: a tag and ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    /// Tag.
    pub tag: String,
    /// Attribute name/value pairs.
    pub attributes: Vec<(String, String)>,
}

impl StyleEntry {
    /// Creates an entry from static pairs.
    #[must_use]
    pub fn new(tag: &str, attributes: &[(&str, &str)]) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }
}

impl Document {
    /// Every declaration in pre-order with its enclosing declaration.
    #[must_use]
    pub fn declarations(&self) -> Vec<(&Declaration, Option<&Declaration>)> {
        let mut out = Vec::new();
        collect_declarations(&self.model.items, None, &mut out);
        out
    }

    /// Every relationship line, wherever it is nested, in pre-order.
    #[must_use]
    pub fn relationships(&self) -> Vec<&RelationshipLine> {
        let mut out = Vec::new();
        collect_relationships(&self.model.items, &mut out);
        out
    }

    /// Renames a variable in declarations, relationships and views.
    pub fn rename_var(&mut self, from: &str, to: &str) {
        rename_in_items(&mut self.model.items, from, to);
        let swap = |v: &mut String| {
            if v.as_str() == from {
                *v = to.to_string();
            }
        };
        for view in &mut self.views.views {
            if let Some(subject) = view.subject.as_mut() {
                swap(subject);
            }
            for line in &mut view.lines {
                match line {
                    ViewLine::IncludeAll => {}
                    ViewLine::Include(v) | ViewLine::Exclude(v) => swap(v),
                    ViewLine::IncludeRel(a, b) | ViewLine::ExcludeRel(a, b) => {
                        for endpoint in [a, b] {
                            if let Endpoint::Var(v) = endpoint {
                                swap(v);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Whether `text` appears anywhere in the document's user-visible strings.
    #[must_use]
    pub fn mentions(&self, text: &str) -> bool {
        if self.comments.iter().any(|c| c.contains(text)) {
            return true;
        }
        let in_decls = self
            .declarations()
            .iter()
            .any(|(d, _)| d.name.contains(text) || d.description.contains(text));
        let in_rels = self
            .relationships()
            .iter()
            .any(|r| r.description.contains(text));
        let in_views = self.views.views.iter().any(|v| {
            v.key.contains(text) || v.name.contains(text) || v.description.contains(text)
        });
        in_decls || in_rels || in_views
    }
}

fn collect_declarations<'a>(
    items: &'a [ModelItem],
    parent: Option<&'a Declaration>,
    out: &mut Vec<(&'a Declaration, Option<&'a Declaration>)>,
) {
    for item in items {
        match item {
            ModelItem::Declaration(decl) => {
                out.push((decl, parent));
                collect_declarations(&decl.items, Some(decl), out);
            }
            ModelItem::Group(group) => collect_declarations(&group.items, parent, out),
            ModelItem::Relationship(_) => {}
        }
    }
}

fn collect_relationships<'a>(items: &'a [ModelItem], out: &mut Vec<&'a RelationshipLine>) {
    for item in items {
        match item {
            ModelItem::Relationship(rel) => out.push(rel),
            ModelItem::Declaration(decl) => collect_relationships(&decl.items, out),
            ModelItem::Group(group) => collect_relationships(&group.items, out),
        }
    }
}

fn rename_in_items(items: &mut [ModelItem], from: &str, to: &str) {
    for item in items {
        match item {
            ModelItem::Declaration(decl) => {
                if decl.var == from {
                    decl.var = to.to_string();
                }
                rename_in_items(&mut decl.items, from, to);
            }
            ModelItem::Relationship(rel) => {
                if rel.source == from {
                    rel.source = to.to_string();
                }
                if rel.destination == from {
                    rel.destination = to.to_string();
                }
            }
            ModelItem::Group(group) => rename_in_items(&mut group.items, from, to),
        }
    }
}
