//! Export-time restriction of relationships to an allow-list of name pairs.

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use super::{Model, Relationship};

impl Model {
    /// Restricts exported relationships to the given `(source, destination)`
    /// display-name pairs. The stored relationships are untouched.
    pub fn restrict_relationships_to<I, A, B>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.allowed_pairs = Some(
            pairs
                .into_iter()
                .map(|(a, b)| (a.into(), b.into()))
                .collect(),
        );
    }

    /// Removes any relationship restriction.
    pub fn clear_relationship_restrictions(&mut self) {
        self.allowed_pairs = None;
    }

    /// Whether a restriction is currently active.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.allowed_pairs.is_some()
    }

    /// Relationships visible to exporters: all of them, or only those whose
    /// endpoint names form an allowed pair.
    #[must_use]
    pub fn effective_relationships(&self) -> Vec<&Relationship> {
        match &self.allowed_pairs {
            None => self.relationships.iter().collect(),
            Some(allowed) => self
                .relationships
                .iter()
                .filter(|r| {
                    let pair = (
                        self.name_of(&r.source).to_string(),
                        self.name_of(&r.destination).to_string(),
                    );
                    allowed.contains(&pair)
                })
                .collect(),
        }
    }

    /// Applies a restriction for the lifetime of the returned guard; the
    /// previous restriction (or none) is restored when it drops.
    pub fn limit_relationships_to<I, A, B>(&mut self, pairs: I) -> RelationshipLimit<'_>
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let previous = self.allowed_pairs.take();
        self.restrict_relationships_to(pairs);
        RelationshipLimit {
            model: self,
            previous: Some(previous),
        }
    }
}

/// Guard returned by [`Model::limit_relationships_to`].
///
/// Derefs to the model so exports can run while the restriction is active.
pub struct RelationshipLimit<'a> {
    model: &'a mut Model,
    previous: Option<Option<HashSet<(String, String)>>>,
}

impl Deref for RelationshipLimit<'_> {
    type Target = Model;

    fn deref(&self) -> &Model {
        self.model
    }
}

impl DerefMut for RelationshipLimit<'_> {
    fn deref_mut(&mut self) -> &mut Model {
        self.model
    }
}

impl Drop for RelationshipLimit<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.model.allowed_pairs = previous;
        }
    }
}
