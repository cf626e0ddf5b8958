//! SAML 2.0 Service Provider trust metadata for an identity provider
//!
//! This crate manages the trust metadata of SPs registered with the IdP:
//! - Locating a metadata document (remote URL, bundled resource, filesystem)
//! - Hardened XML parsing of `EntityDescriptor`/`EntitiesDescriptor` documents
//! - Fail-fast single-document resolvers assembled into a composite chain
//! - Lock-free SP-SSO role descriptor queries concurrent with reloads
//!
//! A registered service whose metadata cannot be loaded degrades to an empty
//! resolver chain instead of failing activation; its descriptor queries then
//! uniformly return `EntityNotFound`.

pub mod error;
pub mod models;
pub mod services;

pub use error::{MetadataError, MetadataResult};
pub use models::{
    default_name_formats, Endpoint, EntityDescriptor, KeyDescriptor, RoleDescriptor, RoleKind,
    SamlRegisteredService, SigningCredential, NAMEID_FORMAT_EMAIL, NAMEID_FORMAT_PERSISTENT,
    NAMEID_FORMAT_TRANSIENT, NAMEID_FORMAT_UNSPECIFIED, SAML20_METADATA_NS, SAML20_PROTOCOL_NS,
};
pub use services::{
    ChainingMetadataResolver, DomMetadataResolver, MetadataDocument, MetadataResource,
    ResourceTransport, SpMetadata, XmlParserPool,
};
