//! Data model for SP trust metadata

pub mod credential;
pub mod descriptor;
pub mod name_id;
pub mod registered_service;

pub use credential::SigningCredential;
pub use descriptor::{
    Endpoint, EntityDescriptor, KeyDescriptor, RoleDescriptor, RoleKind, SAML20_METADATA_NS,
    SAML20_PROTOCOL_NS,
};
pub use name_id::{
    default_name_formats, NAMEID_FORMAT_EMAIL, NAMEID_FORMAT_PERSISTENT, NAMEID_FORMAT_TRANSIENT,
    NAMEID_FORMAT_UNSPECIFIED,
};
pub use registered_service::SamlRegisteredService;
