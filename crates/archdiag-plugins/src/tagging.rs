//! Heuristic tagging strategies.
//!
//! Each strategy matches lower-cased names, descriptions and technologies
//! against fixed substrings and only ever adds tags.

use archdiag_core::{ElementId, ElementKind, Model, PluginError, TaggingStrategy};

/// Tag added by [`AutoExternal`].
pub const EXTERNAL_TAG: &str = "external";
/// Tag added by [`AutoBrokerQueue`] to brokers and queues.
pub const BROKER_TAG: &str = "message-broker";
/// Tag added by [`AutoBrokerQueue`] to queues.
pub const QUEUE_TAG: &str = "queue";

const EXTERNAL_NAME_HINTS: [&str; 3] = ["provider", "gateway", "clearing"];

/// Leaves the model untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTagging;

impl TaggingStrategy for NoTagging {
    fn key(&self) -> &'static str {
        "none"
    }

    fn description(&self) -> &'static str {
        "No tagging"
    }

    fn apply(&self, _model: &mut Model) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Tags software systems that look third-party as `external`.
///
/// A system matches when its description mentions "external" or its name
/// contains "provider", "gateway" or "clearing".
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoExternal;

impl TaggingStrategy for AutoExternal {
    fn key(&self) -> &'static str {
        "auto_external"
    }

    fn description(&self) -> &'static str {
        "Tag external-looking software systems as 'external'"
    }

    fn apply(&self, model: &mut Model) -> Result<(), PluginError> {
        let matches: Vec<ElementId> = model
            .software_systems()
            .filter(|s| {
                let name = s.name.to_lowercase();
                s.description.to_lowercase().contains("external")
                    || EXTERNAL_NAME_HINTS.iter().any(|h| name.contains(h))
            })
            .map(|s| s.id.clone())
            .collect();
        for id in &matches {
            model.add_tags(id, [EXTERNAL_TAG])?;
        }
        tracing::debug!("auto_external tagged {} system(s)", matches.len());
        Ok(())
    }
}

/// Tags broker and queue containers.
///
/// - technology or name contains "kafka" → `message-broker`
/// - technology contains "redis stream", or name or technology contains
///   "queue" → `message-broker` and `queue`
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoBrokerQueue;

impl AutoBrokerQueue {
    fn tags_for(name: &str, technology: &str) -> Vec<&'static str> {
        let mut tags = Vec::new();
        if technology.contains("kafka") || name.contains("kafka") {
            tags.push(BROKER_TAG);
        }
        if technology.contains("redis stream")
            || name.contains("queue")
            || technology.contains("queue")
        {
            tags.push(BROKER_TAG);
            tags.push(QUEUE_TAG);
        }
        tags
    }
}

impl TaggingStrategy for AutoBrokerQueue {
    fn key(&self) -> &'static str {
        "auto_broker_queue"
    }

    fn description(&self) -> &'static str {
        "Tag Kafka/queue containers as 'message-broker' and 'queue'"
    }

    fn apply(&self, model: &mut Model) -> Result<(), PluginError> {
        let mut updates: Vec<(ElementId, Vec<&'static str>)> = Vec::new();
        for system in model.software_systems() {
            for container in model.children_of(&system.id, ElementKind::Container) {
                let tags = Self::tags_for(
                    &container.name.to_lowercase(),
                    &container
                        .technology
                        .as_deref()
                        .unwrap_or_default()
                        .to_lowercase(),
                );
                if !tags.is_empty() {
                    updates.push((container.id.clone(), tags));
                }
            }
        }
        for (id, tags) in &updates {
            model.add_tags(id, tags.iter().copied())?;
        }
        tracing::debug!("auto_broker_queue tagged {} container(s)", updates.len());
        Ok(())
    }
}
