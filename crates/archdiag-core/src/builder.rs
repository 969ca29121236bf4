//! Contribution traits: model builders, view sources and overlays.

use crate::error::ModelError;
use crate::model::Model;
use crate::view::ViewSpec;

/// One contribution to the model.
///
/// Composition runs every builder's [`define`](ModelBuilder::define) before
/// any builder's [`link`](ModelBuilder::link), so relationships may reference
/// elements declared by builders that come later in discovery order.
///
/// # Example
///
/// ```
/// use archdiag_core::{compose, Model, ModelBuilder, ModelError, RelationshipSpec};
///
/// struct Portal;
///
/// impl ModelBuilder for Portal {
///     fn name(&self) -> &str { "portal" }
///
///     fn define(&self, model: &mut Model) -> Result<(), ModelError> {
///         model.add_person("User", "");
///         model.add_software_system("Portal", "Web portal");
///         Ok(())
///     }
///
///     fn link(&self, model: &mut Model) -> Result<(), ModelError> {
///         model.relate("person:User", "Portal", RelationshipSpec::new("uses"))?;
///         Ok(())
///     }
/// }
///
/// let builders: Vec<Box<dyn ModelBuilder>> = vec![Box::new(Portal)];
/// let model = compose(Model::new("Demo", ""), &builders)?;
/// assert_eq!(model.relationships().len(), 1);
/// # Ok::<(), ModelError>(())
/// ```
pub trait ModelBuilder: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Declares elements.
    ///
    /// # Errors
    ///
    /// Returns an error when a referenced parent does not exist.
    fn define(&self, model: &mut Model) -> Result<(), ModelError>;

    /// Declares relationships and anything else that references other builders' elements.
    ///
    /// # Errors
    ///
    /// Returns an error when a referenced element does not exist.
    fn link(&self, _model: &mut Model) -> Result<(), ModelError> {
        Ok(())
    }
}

/// Boxed model builder.
pub type ModelBuilderBox = Box<dyn ModelBuilder>;

/// Something that contributes view specs.
pub trait ViewSource: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// The specs this source contributes.
    fn views(&self) -> Vec<ViewSpec>;
}

/// A structural edit applied after composition (e.g. swapping a container).
pub trait Overlay: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Applies the edit.
    ///
    /// # Errors
    ///
    /// Returns an error when the edit references unknown elements.
    fn apply(&self, model: &mut Model) -> Result<(), ModelError>;
}

/// Boxed overlay.
pub type OverlayBox = Box<dyn Overlay>;

/// Runs every builder's define phase, then every link phase, on `model`.
///
/// # Errors
///
/// Returns the first builder error; composition stops there.
pub fn compose(mut model: Model, builders: &[ModelBuilderBox]) -> Result<Model, ModelError> {
    for builder in builders {
        tracing::debug!("Defining elements from '{}'", builder.name());
        builder.define(&mut model)?;
    }
    for builder in builders {
        tracing::debug!("Linking relationships from '{}'", builder.name());
        builder.link(&mut model)?;
    }
    Ok(model)
}

/// Applies overlays in order. A failing overlay is logged and skipped.
///
/// Returns the number of overlays that applied cleanly.
pub fn apply_overlays(model: &mut Model, overlays: &[OverlayBox]) -> usize {
    let mut applied = 0;
    for overlay in overlays {
        match overlay.apply(model) {
            Ok(()) => {
                tracing::debug!("Applied overlay '{}'", overlay.name());
                applied += 1;
            }
            Err(e) => tracing::warn!("Overlay '{}' failed: {e}", overlay.name()),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationshipSpec;

    struct Linker;

    impl ModelBuilder for Linker {
        fn name(&self) -> &str {
            "linker"
        }
        fn define(&self, _model: &mut Model) -> Result<(), ModelError> {
            Ok(())
        }
        fn link(&self, model: &mut Model) -> Result<(), ModelError> {
            model.relate("A", "B", RelationshipSpec::new("calls"))?;
            Ok(())
        }
    }

    struct Definer;

    impl ModelBuilder for Definer {
        fn name(&self) -> &str {
            "definer"
        }
        fn define(&self, model: &mut Model) -> Result<(), ModelError> {
            model.add_software_system("A", "");
            model.add_software_system("B", "");
            Ok(())
        }
    }

    struct Broken;

    impl Overlay for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn apply(&self, model: &mut Model) -> Result<(), ModelError> {
            model.get_system("Nope").map(|_| ())
        }
    }

    struct TagA;

    impl Overlay for TagA {
        fn name(&self) -> &str {
            "tag-a"
        }
        fn apply(&self, model: &mut Model) -> Result<(), ModelError> {
            let a = model.get_system("A")?;
            model.add_tags(&a, ["overlaid"])
        }
    }

    #[test]
    fn link_phase_sees_later_definitions() {
        let builders: Vec<ModelBuilderBox> = vec![Box::new(Linker), Box::new(Definer)];
        let model = compose(Model::new("T", ""), &builders).unwrap();
        assert_eq!(model.relationships().len(), 1);
    }

    #[test]
    fn failing_overlay_does_not_stop_the_rest() {
        let builders: Vec<ModelBuilderBox> = vec![Box::new(Definer)];
        let mut model = compose(Model::new("T", ""), &builders).unwrap();
        let overlays: Vec<OverlayBox> = vec![Box::new(Broken), Box::new(TagA)];
        assert_eq!(apply_overlays(&mut model, &overlays), 1);
        let a = model.get_system("A").unwrap();
        assert!(model.element(&a).unwrap().tags.contains("overlaid"));
    }
}
