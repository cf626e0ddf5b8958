//! Single-document metadata resolver
//!
//! Wraps one parsed metadata document behind a queryable resolver with
//! fail-fast initialization: a document that does not pass strict validity
//! checks yields no resolver at all rather than a partially usable one.

use crate::error::{MetadataError, MetadataResult};
use crate::models::EntityDescriptor;
use crate::services::parser::MetadataDocument;
use chrono::Utc;
use std::collections::HashSet;

/// A metadata resolver bound to a single parsed document.
///
/// Immutable once initialized; replaced wholesale on reload.
#[derive(Debug, Clone)]
pub struct DomMetadataResolver {
    id: String,
    entities: Vec<EntityDescriptor>,
}

impl DomMetadataResolver {
    /// Build and initialize a resolver over the given document.
    ///
    /// Strict validity is required: every entity must carry a non-empty
    /// `entityID`, must not be expired per its `validUntil`, entity IDs
    /// must be unique within the document, and endpoints must carry both a
    /// binding and a location. Any violation fails the whole resolver; the
    /// caller drops it and logs rather than serving a half-valid document.
    pub fn initialize(document: MetadataDocument, id: impl Into<String>) -> MetadataResult<Self> {
        let id = id.into();
        validate_entities(&document.entities, &id)?;
        Ok(Self {
            id,
            entities: document.entities,
        })
    }

    /// Stable identifier for diagnostics.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// All entity descriptors matching the given entity ID, document order.
    #[must_use]
    pub fn resolve(&self, entity_id: &str) -> Vec<&EntityDescriptor> {
        self.entities
            .iter()
            .filter(|entity| entity.entity_id == entity_id)
            .collect()
    }
}

fn validate_entities(entities: &[EntityDescriptor], id: &str) -> MetadataResult<()> {
    let now = Utc::now();
    let mut seen = HashSet::new();

    for entity in entities {
        if entity.entity_id.is_empty() {
            return Err(MetadataError::ResolverInitialization(format!(
                "[{id}] EntityDescriptor without entityID"
            )));
        }
        if let Some(valid_until) = entity.valid_until {
            if valid_until < now {
                return Err(MetadataError::ResolverInitialization(format!(
                    "[{id}] metadata for {} expired at {valid_until}",
                    entity.entity_id
                )));
            }
        }
        if !seen.insert(entity.entity_id.as_str()) {
            return Err(MetadataError::ResolverInitialization(format!(
                "[{id}] duplicate entityID {}",
                entity.entity_id
            )));
        }
        for role in &entity.roles {
            for endpoint in role
                .assertion_consumer_services
                .iter()
                .chain(&role.single_logout_services)
            {
                if endpoint.binding.is_empty() || endpoint.location.is_empty() {
                    return Err(MetadataError::ResolverInitialization(format!(
                        "[{id}] endpoint of {} missing Binding or Location",
                        entity.entity_id
                    )));
                }
            }
        }
    }
    Ok(())
}
