//! Metadata resolution services

pub mod chain;
pub mod locator;
pub mod parser;
pub mod resolver;
pub mod sp_metadata;

pub use chain::ChainingMetadataResolver;
pub use locator::{MetadataResource, ResourceTransport};
pub use parser::{MetadataDocument, XmlParserPool};
pub use resolver::DomMetadataResolver;
pub use sp_metadata::SpMetadata;
