//! Serialising a [`Document`] to Structurizr DSL text.

use super::document::{
    Declaration, Document, Endpoint, ModelItem, RelationshipLine, StyleEntry, ViewBlock, ViewLine,
};

const INDENT: &str = "  ";

struct Out {
    text: String,
    depth: usize,
}

impl Out {
    fn line(&mut self, content: &str) {
        for _ in 0..self.depth {
            self.text.push_str(INDENT);
        }
        self.text.push_str(content);
        self.text.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(&format!("{header} {{"));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }
}

/// Quotes a string for the DSL.
#[must_use]
pub fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\n', '\r'], " ");
    format!("\"{escaped}\"")
}

/// Renders the document.
#[must_use]
pub fn render(doc: &Document) -> String {
    let mut out = Out {
        text: String::new(),
        depth: 0,
    };
    out.open("workspace");
    for comment in &doc.comments {
        out.line(&format!("// {comment}"));
    }

    out.open("model");
    if !doc.model.properties.is_empty() {
        out.open("properties");
        for (key, value) in &doc.model.properties {
            out.line(&format!("{} {}", quote(key), quote(value)));
        }
        out.close();
    }
    render_items(&mut out, &doc.model.items);
    out.close();

    out.open("views");
    for view in &doc.views.views {
        render_view(&mut out, view);
    }
    if let Some(styles) = &doc.views.styles {
        out.open("styles");
        for entry in &styles.elements {
            render_style(&mut out, "element", entry);
        }
        for entry in &styles.relationships {
            render_style(&mut out, "relationship", entry);
        }
        out.close();
    }
    match doc.views.themes.as_slice() {
        [] => {}
        [theme] => out.line(&format!("theme {theme}")),
        themes => out.line(&format!("themes {}", themes.join(" "))),
    }
    out.close();
    out.close();
    out.text
}

fn render_items(out: &mut Out, items: &[ModelItem]) {
    for item in items {
        match item {
            ModelItem::Declaration(decl) => render_declaration(out, decl),
            ModelItem::Relationship(rel) => out.line(&relationship_line(rel)),
            ModelItem::Group(group) => {
                out.open(&format!("group {}", quote(&group.name)));
                render_items(out, &group.items);
                out.close();
            }
        }
    }
}

fn render_declaration(out: &mut Out, decl: &Declaration) {
    let mut args = vec![quote(&decl.name), quote(&decl.description)];
    let tags = decl.tags.join(",");
    if decl.kind.has_technology() && (decl.technology.is_some() || !tags.is_empty()) {
        args.push(quote(decl.technology.as_deref().unwrap_or("")));
    }
    if !tags.is_empty() {
        args.push(quote(&tags));
    }
    let header = format!("{} = {} {}", decl.var, decl.kind.keyword(), args.join(" "));
    if decl.items.is_empty() {
        out.line(&header);
    } else {
        out.open(&header);
        render_items(out, &decl.items);
        out.close();
    }
}

fn relationship_line(rel: &RelationshipLine) -> String {
    let mut line = format!(
        "{} -> {} {}",
        rel.source,
        rel.destination,
        quote(&rel.description)
    );
    let tags = rel.tags.join(",");
    if rel.technology.is_some() || !tags.is_empty() {
        line.push(' ');
        line.push_str(&quote(rel.technology.as_deref().unwrap_or("")));
    }
    if !tags.is_empty() {
        line.push(' ');
        line.push_str(&quote(&tags));
    }
    line
}

fn render_view(out: &mut Out, view: &ViewBlock) {
    let header = match &view.subject {
        Some(subject) => format!("{} {subject} {}", view.kind.dsl_keyword(), quote(&view.key)),
        None => format!("{} {}", view.kind.dsl_keyword(), quote(&view.key)),
    };
    out.open(&header);
    out.line(&format!(
        "// View: key={} name={}",
        quote(&view.key),
        quote(&view.name)
    ));
    out.line(&format!("title {}", quote(&view.name)));
    out.line(&format!("description {}", quote(&view.description)));
    for line in &view.lines {
        out.line(&view_line(line));
    }
    out.line("autoLayout");
    out.close();
}

fn endpoint(e: &Endpoint) -> &str {
    match e {
        Endpoint::Any => "*",
        Endpoint::Var(v) => v,
    }
}

fn view_line(line: &ViewLine) -> String {
    match line {
        ViewLine::IncludeAll => "include *".to_string(),
        ViewLine::Include(var) => format!("include {var}"),
        ViewLine::Exclude(var) => format!("exclude {var}"),
        ViewLine::IncludeRel(a, b) => format!("include {}->{}", endpoint(a), endpoint(b)),
        ViewLine::ExcludeRel(a, b) => format!("exclude {}->{}", endpoint(a), endpoint(b)),
    }
}

fn render_style(out: &mut Out, kind: &str, entry: &StyleEntry) {
    out.open(&format!("{kind} {}", quote(&entry.tag)));
    for (key, value) in &entry.attributes {
        out.line(&format!("{key} {}", quote(value)));
    }
    out.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::document::{DeclKind, StylesBlock};
    use crate::view::ViewType;

    #[test]
    fn quote_escapes() {
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote("a\nb"), "\"a b\"");
    }

    #[test]
    fn relationship_line_pads_technology_before_tags() {
        let mut rel = RelationshipLine {
            source: "a".into(),
            destination: "b".into(),
            description: "calls".into(),
            technology: None,
            tags: Vec::new(),
        };
        assert_eq!(relationship_line(&rel), r#"a -> b "calls""#);

        rel.tags = vec!["async".into(), "kafka".into()];
        assert_eq!(relationship_line(&rel), r#"a -> b "calls" "" "async,kafka""#);

        rel.technology = Some("gRPC".into());
        rel.tags.clear();
        assert_eq!(relationship_line(&rel), r#"a -> b "calls" "gRPC""#);
    }

    #[test]
    fn renders_fragment() {
        let mut doc = Document::default();
        doc.comments.push("Demo".into());
        doc.model.items = vec![
            ModelItem::Declaration(Declaration {
                var: "portal".into(),
                kind: DeclKind::SoftwareSystem,
                name: "Portal".into(),
                description: String::new(),
                technology: None,
                tags: Vec::new(),
                items: vec![ModelItem::Declaration(Declaration {
                    var: "web".into(),
                    kind: DeclKind::Container,
                    name: "Web".into(),
                    description: "UI".into(),
                    technology: None,
                    tags: vec!["frontend".into()],
                    items: Vec::new(),
                })],
            }),
            ModelItem::Relationship(RelationshipLine {
                source: "web".into(),
                destination: "portal".into(),
                description: "calls".into(),
                technology: Some("HTTPS".into()),
                tags: Vec::new(),
            }),
        ];
        doc.views.views.push(ViewBlock {
            kind: ViewType::Container,
            subject: Some("portal".into()),
            key: "PortalContainers".into(),
            name: "Portal".into(),
            description: String::new(),
            smart: false,
            lines: vec![ViewLine::IncludeAll],
            name_filters: Vec::new(),
            element_excludes: Vec::new(),
            curated: false,
        });
        doc.views.styles = Some(StylesBlock {
            elements: vec![StyleEntry::new("external", &[("background", "#808080")])],
            relationships: Vec::new(),
        });

        insta::assert_snapshot!(render(&doc), @r###"
        workspace {
          // Demo
          model {
            portal = softwareSystem "Portal" "" {
              web = container "Web" "UI" "" "frontend"
            }
            web -> portal "calls" "HTTPS"
          }
          views {
            container portal "PortalContainers" {
              // View: key="PortalContainers" name="Portal"
              title "Portal"
              description ""
              include *
              autoLayout
            }
            styles {
              element "external" {
                background "#808080"
              }
            }
          }
        }
        "###);
    }
}
