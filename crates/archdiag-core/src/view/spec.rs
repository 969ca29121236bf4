//! Declarative view specs and building them against a model.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::ViewError;
use crate::model::{ElementId, Model};
use crate::names::split_path;

use super::resolve::{resolve_name, scope};
use super::{NameFilter, RelationshipFilter, View, ViewType};

/// Callable selector returning element ids.
pub type Query = Arc<dyn Fn(&Model) -> Vec<ElementId> + Send + Sync>;

/// Something that resolves to elements or filters when a view is built.
#[derive(Clone)]
pub enum Selector {
    /// `"System"`, `"System/Container"` or `"person:Name"`.
    Name(String),
    /// Arbitrary query against the model.
    Query(Query),
    /// An id-based relationship filter, carried through verbatim.
    Relationship(RelationshipFilter),
}

impl Selector {
    /// Wraps a closure as a query selector.
    pub fn query<F>(f: F) -> Self
    where
        F: Fn(&Model) -> Vec<ElementId> + Send + Sync + 'static,
    {
        Self::Query(Arc::new(f))
    }

    /// The selector's name, if it is a name selector.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Query(_) => f.write_str("Query(..)"),
            Self::Relationship(filter) => f.debug_tuple("Relationship").field(filter).finish(),
        }
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<RelationshipFilter> for Selector {
    fn from(filter: RelationshipFilter) -> Self {
        Self::Relationship(filter)
    }
}

/// Unbuilt description of one view.
#[derive(Debug, Clone)]
pub struct ViewSpec {
    /// Unique key.
    pub key: String,
    /// Display title.
    pub name: String,
    /// Diagram kind.
    pub view_type: ViewType,
    /// Description.
    pub description: String,
    /// Selection tags.
    pub tags: BTreeSet<String>,
    /// Include selectors.
    pub includes: Vec<Selector>,
    /// Exclude selectors: names become element excludes, filters stay filters.
    pub excludes: Vec<Selector>,
    /// Name-based relationship filters.
    pub filters: Vec<NameFilter>,
    /// `"System"` or `"System/Container"`.
    pub subject: Option<String>,
    /// Smart landscape.
    pub smart: bool,
    /// Key of the base spec this one extends.
    pub extends: Option<String>,
}

impl ViewSpec {
    /// Creates a spec with no selectors.
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>, view_type: ViewType) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            view_type,
            description: String::new(),
            tags: BTreeSet::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            filters: Vec::new(),
            subject: None,
            smart: false,
            extends: None,
        }
    }

    /// Creates a spec that extends the spec keyed `base_key`.
    #[must_use]
    pub fn derive(
        base_key: impl Into<String>,
        key: impl Into<String>,
        name: impl Into<String>,
        view_type: ViewType,
    ) -> Self {
        let mut spec = Self::new(key, name, view_type);
        spec.extends = Some(base_key.into());
        spec
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a selection tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Adds an include selector.
    #[must_use]
    pub fn include(mut self, selector: impl Into<Selector>) -> Self {
        self.includes.push(selector.into());
        self
    }

    /// Adds an exclude selector.
    #[must_use]
    pub fn exclude(mut self, selector: impl Into<Selector>) -> Self {
        self.excludes.push(selector.into());
        self
    }

    /// Adds a name filter.
    #[must_use]
    pub fn filter(mut self, filter: NameFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Marks the spec as a smart landscape.
    #[must_use]
    pub fn smart(mut self, smart: bool) -> Self {
        self.smart = smart;
        self
    }

    /// Builds the view and attaches it to `model`.
    ///
    /// The subject is validated before anything is attached, so a failed
    /// build leaves the model untouched. Include selectors that resolve to
    /// nothing are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] when the subject is missing, malformed or
    /// unknown, or the view type cannot be built.
    pub fn build<'m>(&self, model: &'m mut Model) -> Result<&'m View, ViewError> {
        let subject = self.resolve_subject(model)?;

        let mut view = View::new(self.key.clone(), self.name.clone(), self.view_type);
        view.description.clone_from(&self.description);
        view.smart = self.smart && self.view_type == ViewType::SystemLandscape;
        view.subject.clone_from(&subject);

        if self.view_type == ViewType::SystemContext {
            if let Some(system) = &subject {
                view.include(system.clone());
            }
        }

        for selector in &self.includes {
            match selector {
                Selector::Name(name) => match resolve_name(model, name) {
                    Some(id) => self.include_scoped(model, &mut view, subject.as_ref(), &id),
                    None => {
                        tracing::warn!("View '{}': include '{}' not found, skipping", self.key, name);
                    }
                },
                Selector::Query(query) => {
                    for id in query(&*model) {
                        self.include_scoped(model, &mut view, subject.as_ref(), &id);
                    }
                }
                Selector::Relationship(filter) => view.relationship_filters.push(filter.clone()),
            }
        }

        for selector in &self.excludes {
            match selector {
                Selector::Name(name) => view.element_excludes.push(name.clone()),
                Selector::Query(query) => view.element_excludes.extend(
                    query(&*model)
                        .iter()
                        .filter_map(|id| model.element(id))
                        .map(|e| e.name.clone()),
                ),
                Selector::Relationship(filter) => view.relationship_filters.push(filter.clone()),
            }
        }

        view.name_filters.clone_from(&self.filters);
        tracing::debug!(
            "Built view '{}' ({}, {} includes)",
            self.key,
            self.view_type,
            view.includes.len()
        );
        Ok(model.add_view(view))
    }

    /// Module of this spec: the normalised first segment of its subject.
    #[must_use]
    pub fn module(&self) -> Option<String> {
        crate::names::module_of(self.subject.as_deref())
    }

    fn include_scoped(
        &self,
        model: &Model,
        view: &mut View,
        subject: Option<&ElementId>,
        id: &ElementId,
    ) {
        match scope(model, self.view_type, subject, id) {
            Some(target) => view.include(target),
            None => tracing::debug!(
                "View '{}': '{}' is out of scope for a {} view",
                self.key,
                model.name_of(id),
                self.view_type
            ),
        }
    }

    fn resolve_subject(&self, model: &Model) -> Result<Option<ElementId>, ViewError> {
        let missing = || ViewError::MissingSubject {
            key: self.key.clone(),
            view_type: self.view_type,
        };
        let malformed = |subject: &str| ViewError::MalformedSubject {
            key: self.key.clone(),
            view_type: self.view_type,
            subject: subject.to_string(),
        };
        let lookup = |source| ViewError::Subject {
            key: self.key.clone(),
            source,
        };
        let subject = self.subject.as_deref().map(str::trim).filter(|s| !s.is_empty());

        match self.view_type {
            ViewType::SystemLandscape => Ok(None),
            ViewType::SystemContext | ViewType::Container => {
                let subject = subject.ok_or_else(missing)?;
                let system = split_path(subject).map_or(subject, |(system, _)| system);
                model.get_system(system).map(Some).map_err(lookup)
            }
            ViewType::Component => {
                let subject = subject.ok_or_else(missing)?;
                let (system, container) = split_path(subject).ok_or_else(|| malformed(subject))?;
                model.get_container(system, container).map(Some).map_err(lookup)
            }
            ViewType::Deployment => Err(ViewError::Unsupported {
                key: self.key.clone(),
                view_type: self.view_type,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;
    use crate::view::FilterKind;

    fn model() -> Model {
        let mut m = Model::new("T", "");
        m.add_person("Customer", "");
        let core = m.add_software_system("Core", "");
        let api = m.add_container(&core, "API", "", None).unwrap();
        m.add_component(&api, "Router", "", None).unwrap();
        m.add_software_system("Ledger", "");
        m
    }

    // -- Subjects --

    #[test]
    fn context_requires_subject() {
        let mut m = model();
        let err = ViewSpec::new("Ctx", "Ctx", ViewType::SystemContext)
            .build(&mut m)
            .unwrap_err();
        assert!(matches!(err, ViewError::MissingSubject { .. }));
        assert!(m.views().is_empty());
    }

    #[test]
    fn container_accepts_system_or_path_subject() {
        let mut m = model();
        let plain = ViewSpec::new("C1", "C1", ViewType::Container)
            .subject("Core")
            .build(&mut m)
            .unwrap()
            .subject
            .clone();
        assert_eq!(plain.as_ref().unwrap().as_str(), "core");

        let path = ViewSpec::new("C2", "C2", ViewType::Container)
            .subject("Core/API")
            .build(&mut m)
            .unwrap()
            .subject
            .clone();
        assert_eq!(path, plain);
    }

    #[test]
    fn component_requires_path_subject() {
        let mut m = model();
        let err = ViewSpec::new("C", "C", ViewType::Component)
            .subject("Core")
            .build(&mut m)
            .unwrap_err();
        assert!(matches!(err, ViewError::MalformedSubject { .. }));
        assert!(m.views().is_empty());
    }

    #[test]
    fn component_with_unknown_container_fails_cleanly() {
        let mut m = model();
        let err = ViewSpec::new("C", "C", ViewType::Component)
            .subject("Core/Gone")
            .build(&mut m)
            .unwrap_err();
        assert!(matches!(err, ViewError::Subject { .. }));
        assert!(m.views().is_empty());
    }

    #[test]
    fn deployment_is_unsupported() {
        let mut m = model();
        let err = ViewSpec::new("D", "D", ViewType::Deployment)
            .build(&mut m)
            .unwrap_err();
        assert!(matches!(err, ViewError::Unsupported { .. }));
    }

    // -- Includes --

    #[test]
    fn landscape_component_include_becomes_system() {
        let mut m = model();
        let query = Selector::query(|m: &Model| {
            m.iter_elements()
                .filter(|e| e.kind == ElementKind::Component)
                .map(|e| e.id.clone())
                .collect()
        });
        let view = ViewSpec::new("L", "L", ViewType::SystemLandscape)
            .include(query)
            .include("Core/API")
            .build(&mut m)
            .unwrap();
        let ids: Vec<&str> = view.includes.iter().map(ElementId::as_str).collect();
        assert_eq!(ids, vec!["core"]);
    }

    #[test]
    fn unresolved_includes_are_skipped() {
        let mut m = model();
        let view = ViewSpec::new("L", "L", ViewType::SystemLandscape)
            .include("Nope")
            .include("person:Customer")
            .build(&mut m)
            .unwrap();
        assert_eq!(view.includes.len(), 1);
    }

    #[test]
    fn context_view_includes_its_subject() {
        let mut m = model();
        let view = ViewSpec::new("Ctx", "Ctx", ViewType::SystemContext)
            .subject("Core")
            .include("Ledger")
            .build(&mut m)
            .unwrap();
        let ids: Vec<&str> = view.includes.iter().map(ElementId::as_str).collect();
        assert_eq!(ids, vec!["core", "ledger"]);
    }

    #[test]
    fn excludes_split_into_names_and_filters() {
        let mut m = model();
        let ledger = m.get_system("Ledger").unwrap();
        let view = ViewSpec::new("L", "L", ViewType::SystemLandscape)
            .smart(true)
            .exclude("Core")
            .exclude(RelationshipFilter::exclude(Some(ledger), None, Vec::new()))
            .filter(NameFilter::include(Some("Core"), None))
            .build(&mut m)
            .unwrap();
        assert!(view.smart);
        assert_eq!(view.element_excludes, vec!["Core"]);
        assert_eq!(view.relationship_filters[0].kind, FilterKind::Exclude);
        assert_eq!(view.name_filters.len(), 1);
    }

    #[test]
    fn smart_is_ignored_outside_landscape() {
        let mut m = model();
        let view = ViewSpec::new("C", "C", ViewType::Container)
            .subject("Core/API")
            .smart(true)
            .build(&mut m)
            .unwrap();
        assert!(!view.smart);
        assert_eq!(view.subject.as_ref().unwrap().as_str(), "core");
    }
}
