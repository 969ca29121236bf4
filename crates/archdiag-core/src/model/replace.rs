//! Swapping one container for another and rewiring its relationships.

use std::collections::HashSet;

use super::{ElementId, ElementKind, Model, RelationshipKey};
use crate::error::ModelError;

/// Options for [`Model::replace_container`].
#[derive(Debug, Clone)]
pub struct ReplaceOptions {
    /// Description for the new container when it is created.
    pub description: String,
    /// Technology for the new container.
    pub technology: Option<String>,
    /// Tags added to the new container.
    pub tag_new: Vec<String>,
    /// Tags added to the old container (only meaningful with `remove_old = false`).
    pub tag_old: Vec<String>,
    /// Remove the old container once rewired.
    pub remove_old: bool,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            description: String::new(),
            technology: None,
            tag_new: Vec::new(),
            tag_old: Vec::new(),
            remove_old: true,
        }
    }
}

/// What [`Model::replace_container`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceReport {
    /// The replacement container.
    pub new_container: ElementId,
    /// The replaced container, if it existed.
    pub old_container: Option<ElementId>,
    /// Relationships whose endpoint was moved to the new container.
    pub rewired_count: usize,
    /// Whether the old container was removed.
    pub removed_old: bool,
    /// Whether the new container had to be created.
    pub created_new: bool,
}

impl Model {
    /// Ensures container `new` exists under `system` and moves every
    /// relationship touching container `old` onto it.
    ///
    /// A missing `old` container is not an error: the new container is still
    /// ensured and nothing is rewired. A rewired relationship whose identity
    /// already exists is dropped rather than duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownSystem`] if `system` was never declared.
    pub fn replace_container(
        &mut self,
        system: &str,
        old: &str,
        new: &str,
        options: ReplaceOptions,
    ) -> Result<ReplaceReport, ModelError> {
        let system_id = self.get_system(system)?;
        let (new_id, created_new) = self.ensure_child(
            &system_id,
            ElementKind::Container,
            new,
            &options.description,
            options.technology.as_deref(),
        );
        self.add_tags(&new_id, options.tag_new.iter().cloned())?;

        let mut report = ReplaceReport {
            new_container: new_id.clone(),
            old_container: None,
            rewired_count: 0,
            removed_old: false,
            created_new,
        };

        let Ok(old_id) = self.get_container(system, old) else {
            tracing::debug!("Container '{system}/{old}' not found, nothing to rewire");
            return Ok(report);
        };
        report.old_container = Some(old_id.clone());
        self.add_tags(&old_id, options.tag_old.iter().cloned())?;
        if old_id == new_id {
            return Ok(report);
        }

        let mut seen: HashSet<RelationshipKey> = HashSet::new();
        let mut rewired = 0;
        let mut relationships = std::mem::take(self.relationships_mut());
        for rel in &mut relationships {
            let mut changed = false;
            if rel.source == old_id {
                rel.source = new_id.clone();
                changed = true;
            }
            if rel.destination == old_id {
                rel.destination = new_id.clone();
                changed = true;
            }
            if changed {
                rewired += 1;
            }
        }
        relationships.retain(|rel| seen.insert(self.key_of(rel)));
        *self.relationships_mut() = relationships;
        self.rebuild_relationship_keys();
        report.rewired_count = rewired;

        if options.remove_old {
            self.remove_element(&old_id);
            self.drop_dangling_relationships();
            report.removed_old = true;
        }
        tracing::debug!(
            "Replaced container '{system}/{old}' with '{new}' ({rewired} relationships rewired)"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationshipSpec;

    fn with_kafka() -> Model {
        let mut m = Model::new("Payments", "");
        let sys = m.add_software_system("Payments", "");
        m.add_container(&sys, "API", "", None).unwrap();
        m.add_container(&sys, "Kafka", "", Some("Kafka")).unwrap();
        m.add_container(&sys, "Worker", "", None).unwrap();
        m.relate("Payments/API", "Payments/Kafka", RelationshipSpec::new("Publishes"))
            .unwrap();
        m.relate("Payments/Kafka", "Payments/Worker", RelationshipSpec::new("Delivers"))
            .unwrap();
        m
    }

    #[test]
    fn replace_rewires_and_removes_old() {
        let mut m = with_kafka();
        let report = m
            .replace_container(
                "Payments",
                "Kafka",
                "Redis Streams",
                ReplaceOptions {
                    technology: Some("Redis".into()),
                    ..ReplaceOptions::default()
                },
            )
            .unwrap();
        assert_eq!(report.rewired_count, 2);
        assert!(report.created_new);
        assert!(report.removed_old);
        assert!(!m.contains("Payments/Kafka"));

        let api = m.get("Payments/API").unwrap();
        let redis = m.get("Payments/Redis Streams").unwrap();
        assert!(m
            .relationships()
            .iter()
            .any(|r| r.source == api && r.destination == redis));
        assert!(m.relationships().iter().all(|r| !r.source.as_str().contains("kafka")));
    }

    #[test]
    fn replace_keeps_old_when_asked_and_tags_it() {
        let mut m = with_kafka();
        let report = m
            .replace_container(
                "Payments",
                "Kafka",
                "Redis",
                ReplaceOptions {
                    tag_old: vec!["deprecated".into()],
                    tag_new: vec!["new".into()],
                    remove_old: false,
                    ..ReplaceOptions::default()
                },
            )
            .unwrap();
        assert!(!report.removed_old);
        let old = report.old_container.unwrap();
        assert!(m.element(&old).unwrap().tags.contains("deprecated"));
        assert!(m.element(&report.new_container).unwrap().tags.contains("new"));
    }

    #[test]
    fn replace_with_missing_old_still_ensures_new() {
        let mut m = with_kafka();
        let report = m
            .replace_container("Payments", "RabbitMQ", "Redis", ReplaceOptions::default())
            .unwrap();
        assert!(report.old_container.is_none());
        assert_eq!(report.rewired_count, 0);
        assert!(m.contains("Payments/Redis"));
        assert_eq!(m.relationships().len(), 2);
    }

    #[test]
    fn replace_with_unknown_system_fails() {
        let mut m = with_kafka();
        let err = m
            .replace_container("Ledger", "Kafka", "Redis", ReplaceOptions::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownSystem { .. }));
    }

    #[test]
    fn rewired_duplicate_is_collapsed() {
        let mut m = with_kafka();
        let sys = m.get_system("Payments").unwrap();
        m.add_container(&sys, "Redis", "", None).unwrap();
        m.relate("Payments/API", "Payments/Redis", RelationshipSpec::new("Publishes"))
            .unwrap();
        let report = m
            .replace_container("Payments", "Kafka", "Redis", ReplaceOptions::default())
            .unwrap();
        assert!(!report.created_new);
        let publishes = m
            .relationships()
            .iter()
            .filter(|r| r.description == "Publishes")
            .count();
        assert_eq!(publishes, 1);
    }
}
