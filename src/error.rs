//! Metadata-specific error types

use thiserror::Error;

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors raised while locating, loading or querying SP metadata.
///
/// `Configuration` is fatal to initialization of the owning service;
/// `Parse` and `ResolverInitialization` are recoverable and leave the
/// service with a reduced (possibly empty) resolver chain; `EntityNotFound`
/// and `AmbiguousEntity` are ordinary query-time results.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Metadata location unreachable, unreadable or unclassifiable
    #[error("Metadata location cannot be determined: {0}")]
    Configuration(String),

    /// Malformed XML or I/O failure while reading the metadata document
    #[error("Metadata parse error: {0}")]
    Parse(String),

    /// A single metadata document failed structural validation
    #[error("Metadata resolver initialization failed: {0}")]
    ResolverInitialization(String),

    /// No matching entity descriptor for the given entity ID
    #[error("Cannot find entity {0} in metadata provider")]
    EntityNotFound(String),

    /// More than one entity descriptor matched the given entity ID
    #[error("Entity {0} matched more than one descriptor in the resolver chain")]
    AmbiguousEntity(String),
}

impl MetadataError {
    /// Whether this error must abort initialization of the owning service.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, MetadataError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(MetadataError::Configuration("bad location".into()).is_fatal());
        assert!(!MetadataError::Parse("bad xml".into()).is_fatal());
        assert!(!MetadataError::ResolverInitialization("invalid".into()).is_fatal());
        assert!(!MetadataError::EntityNotFound("https://sp.example.org".into()).is_fatal());
        assert!(!MetadataError::AmbiguousEntity("https://sp.example.org".into()).is_fatal());
    }

    #[test]
    fn test_not_found_message_names_entity() {
        let err = MetadataError::EntityNotFound("https://sp.example.org".into());
        assert!(err.to_string().contains("https://sp.example.org"));
    }
}
