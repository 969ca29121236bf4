//! Structurizr DSL export.
//!
//! The model and its built views are lowered into a typed [`Document`], the
//! rewriting [`passes`] run over that tree, and [`render`] serialises it once.
//! Output is deterministic: the same model always yields the same bytes.

mod document;
mod index;
mod lower;
pub mod passes;
mod render;

pub use document::{
    DeclKind, Declaration, Document, Endpoint, GroupBlock, ModelBlock, ModelItem,
    RelationshipLine, StyleEntry, StylesBlock, ViewBlock, ViewLine, ViewsBlock,
};
pub use lower::lower;
pub use render::{quote, render};

use crate::model::Model;

/// Renders `model` and its views as a Structurizr DSL workspace.
#[must_use]
pub fn dump_dsl(model: &Model) -> String {
    let mut doc = lower(model);
    passes::apply_all(&mut doc);
    render(&doc)
}
