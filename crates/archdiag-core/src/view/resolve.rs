//! Selector resolution and view-type scoping of included elements.

use crate::model::{ElementId, ElementKind, Model, PERSON_PREFIX};
use crate::names::split_path;

use super::ViewType;

/// Resolves a name selector to an element.
///
/// `person:Name` picks a person, `System/Container` a container (falling back
/// to the system when the container is gone), anything else a system.
pub(crate) fn resolve_name(model: &Model, selector: &str) -> Option<ElementId> {
    if let Some(person) = selector.strip_prefix(PERSON_PREFIX) {
        return model.get_person(person).ok();
    }
    if let Some((system, container)) = split_path(selector) {
        return model
            .get_container(system, container)
            .or_else(|_| model.get_system(system))
            .ok();
    }
    model.get_system(selector).ok()
}

/// Maps an element to what a view of `view_type` may show for it.
///
/// Returns `None` when the element has no valid stand-in in this view.
pub(crate) fn scope(
    model: &Model,
    view_type: ViewType,
    subject: Option<&ElementId>,
    id: &ElementId,
) -> Option<ElementId> {
    let element = model.element(id)?;
    let own_system = || model.parent_system(id).cloned();
    match (view_type, element.kind) {
        (_, kind) if kind.is_deployment() => None,
        (ViewType::Deployment, _) => None,
        (_, ElementKind::Person | ElementKind::SoftwareSystem) => Some(id.clone()),
        (ViewType::SystemLandscape | ViewType::SystemContext, _) => own_system(),
        (ViewType::Container, ElementKind::Container) => {
            let system = model.parent_system(id);
            if system.is_some() && system == subject {
                Some(id.clone())
            } else {
                own_system()
            }
        }
        (ViewType::Container, _) => own_system(),
        (ViewType::Component, ElementKind::Container) => Some(id.clone()),
        (ViewType::Component, _) => {
            let container = model.parent_container(id);
            (container.is_some() && container == subject).then(|| id.clone())
        }
    }
}
