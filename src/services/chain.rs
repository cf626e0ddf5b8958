//! Composite metadata resolver
//!
//! Aggregates zero or more single-document resolvers behind one query
//! interface so a service can later draw on several metadata sources
//! without changing its callers.

use crate::error::{MetadataError, MetadataResult};
use crate::models::EntityDescriptor;
use crate::services::resolver::DomMetadataResolver;

/// Diagnostic identifier for assembled chains
const CHAIN_RESOLVER_ID: &str = "chaining-metadata-resolver";

/// An ordered chain of single-document resolvers.
///
/// A chain may be empty; querying an empty chain is a plain not-found, not
/// an error. A fully constructed chain is immutable: reload builds a new
/// chain and swaps it in atomically.
#[derive(Debug)]
pub struct ChainingMetadataResolver {
    id: String,
    resolvers: Vec<DomMetadataResolver>,
}

impl ChainingMetadataResolver {
    #[must_use]
    pub fn new(resolvers: Vec<DomMetadataResolver>) -> Self {
        Self {
            id: CHAIN_RESOLVER_ID.to_string(),
            resolvers,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolve exactly one entity descriptor for the given entity ID.
    ///
    /// Zero matches across the chain is [`MetadataError::EntityNotFound`];
    /// more than one is [`MetadataError::AmbiguousEntity`] so operators can
    /// tell a missing SP from conflicting metadata sources.
    pub fn resolve_single(&self, entity_id: &str) -> MetadataResult<&EntityDescriptor> {
        let mut matches = self
            .resolvers
            .iter()
            .flat_map(|resolver| resolver.resolve(entity_id));

        let first = matches
            .next()
            .ok_or_else(|| MetadataError::EntityNotFound(entity_id.to_string()))?;

        if matches.next().is_some() {
            return Err(MetadataError::AmbiguousEntity(entity_id.to_string()));
        }
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parser::MetadataDocument;

    fn resolver(id: &str, entity_ids: &[&str]) -> DomMetadataResolver {
        let entities = entity_ids
            .iter()
            .map(|entity_id| EntityDescriptor {
                entity_id: (*entity_id).to_string(),
                valid_until: None,
                roles: Vec::new(),
            })
            .collect();
        DomMetadataResolver::initialize(MetadataDocument { entities }, id).unwrap()
    }

    #[test]
    fn test_empty_chain_is_not_found() {
        let chain = ChainingMetadataResolver::new(Vec::new());
        assert!(chain.is_empty());
        let err = chain.resolve_single("https://sp.example.org").unwrap_err();
        assert!(matches!(err, MetadataError::EntityNotFound(_)));
    }

    #[test]
    fn test_resolves_across_resolvers() {
        let chain = ChainingMetadataResolver::new(vec![
            resolver("first", &["https://a.example.org"]),
            resolver("second", &["https://b.example.org"]),
        ]);
        assert_eq!(chain.len(), 2);

        let entity = chain.resolve_single("https://b.example.org").unwrap();
        assert_eq!(entity.entity_id, "https://b.example.org");
    }

    #[test]
    fn test_duplicate_across_resolvers_is_ambiguous() {
        let chain = ChainingMetadataResolver::new(vec![
            resolver("first", &["https://sp.example.org"]),
            resolver("second", &["https://sp.example.org"]),
        ]);
        let err = chain.resolve_single("https://sp.example.org").unwrap_err();
        assert!(matches!(err, MetadataError::AmbiguousEntity(_)));
    }

    #[test]
    fn test_unknown_entity_is_not_found() {
        let chain = ChainingMetadataResolver::new(vec![resolver(
            "first",
            &["https://sp.example.org"],
        )]);
        let err = chain.resolve_single("https://other.example.org").unwrap_err();
        assert!(matches!(err, MetadataError::EntityNotFound(_)));
    }
}
