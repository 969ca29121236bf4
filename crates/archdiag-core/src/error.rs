//! Error types for model mutation and view building.

use miette::Diagnostic;

use crate::model::ElementKind;
use crate::view::ViewType;

/// Errors raised by [`crate::Model`] lookups and mutations.
///
/// Elements must be declared before they are referenced; every lookup
/// failure surfaces as one of these rather than creating a phantom element.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum ModelError {
    /// A software system was referenced before it was declared.
    #[error("expected software system '{name}' to be defined before access")]
    #[diagnostic(
        code(archdiag::model::unknown_system),
        help("declare the system in a model file that is composed before this reference")
    )]
    UnknownSystem {
        /// Display name that was looked up.
        name: String,
    },

    /// A container was referenced before it was declared.
    #[error("expected container '{name}' to exist in system '{system}'")]
    #[diagnostic(code(archdiag::model::unknown_container))]
    UnknownContainer {
        /// Display name of the owning system.
        system: String,
        /// Display name of the container.
        name: String,
    },

    /// A person was referenced before it was declared.
    #[error("expected person '{name}' to be defined before access")]
    #[diagnostic(code(archdiag::model::unknown_person))]
    UnknownPerson {
        /// Display name that was looked up.
        name: String,
    },

    /// An element id is not registered in this model.
    #[error("no element with id '{id}' in this model")]
    #[diagnostic(code(archdiag::model::unknown_element))]
    UnknownElement {
        /// The missing id.
        id: String,
    },

    /// An element was used where a different kind is required.
    #[error("element '{id}' is a {actual}, expected a {expected}")]
    #[diagnostic(code(archdiag::model::wrong_kind))]
    WrongKind {
        /// Offending element id.
        id: String,
        /// Required kind.
        expected: ElementKind,
        /// Actual kind.
        actual: ElementKind,
    },

    /// Relationships need a description.
    #[error("relationship description cannot be empty ({source_name} -> {destination_name})")]
    #[diagnostic(code(archdiag::model::empty_relationship))]
    EmptyRelationshipDescription {
        /// Source display name.
        source_name: String,
        /// Destination display name.
        destination_name: String,
    },
}

/// Errors raised while building a [`crate::ViewSpec`] against a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum ViewError {
    /// The view type needs a subject and none was given.
    #[error("{view_type} view '{key}' requires a subject")]
    #[diagnostic(code(archdiag::view::missing_subject))]
    MissingSubject {
        /// View key.
        key: String,
        /// View type.
        view_type: ViewType,
    },

    /// The subject is not in the form the view type needs.
    #[error("{view_type} view '{key}' requires subject in 'System/Container' form, got '{subject}'")]
    #[diagnostic(code(archdiag::view::malformed_subject))]
    MalformedSubject {
        /// View key.
        key: String,
        /// View type.
        view_type: ViewType,
        /// Subject as given.
        subject: String,
    },

    /// The view type cannot be built from a spec.
    #[error("unsupported view type {view_type} for view '{key}'")]
    #[diagnostic(code(archdiag::view::unsupported))]
    Unsupported {
        /// View key.
        key: String,
        /// View type.
        view_type: ViewType,
    },

    /// Subject lookup failed.
    #[error("view '{key}': {source}")]
    #[diagnostic(code(archdiag::view::subject))]
    Subject {
        /// View key.
        key: String,
        /// Underlying lookup failure.
        source: ModelError,
    },
}
