//! In-memory representation of SAML 2.0 metadata descriptors
//!
//! Covers the subset of the federation metadata schema the IdP needs to
//! drive SSO against a registered SP: entity descriptors, role descriptors,
//! endpoints and key material.

use chrono::{DateTime, Utc};

/// SAML 2.0 metadata namespace
pub const SAML20_METADATA_NS: &str = "urn:oasis:names:tc:SAML:2.0:metadata";
/// SAML 2.0 protocol namespace, as listed in `protocolSupportEnumeration`
pub const SAML20_PROTOCOL_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// The role a `RoleDescriptor` plays within an entity descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleKind {
    /// `SPSSODescriptor` — service provider single sign-on
    SpSso,
    /// `IDPSSODescriptor` — identity provider single sign-on
    IdpSso,
    /// Any other role element (attribute authority, PDP, ...)
    Other(String),
}

/// A protocol endpoint (`AssertionConsumerService`, `SingleLogoutService`, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub binding: String,
    pub location: String,
    /// `index` attribute, present on indexed endpoints such as ACS
    pub index: Option<u32>,
    pub is_default: bool,
}

/// Key material advertised by a role (`KeyDescriptor`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDescriptor {
    /// `use` attribute: `signing`, `encryption`, or absent (both)
    pub key_use: Option<String>,
    /// Base64 DER certificate from `ds:X509Certificate`, whitespace stripped
    pub certificate: Option<String>,
}

/// One role descriptor of an entity, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDescriptor {
    pub kind: RoleKind,
    /// Namespaces from `protocolSupportEnumeration`, split on whitespace
    pub protocol_support: Vec<String>,
    pub key_descriptors: Vec<KeyDescriptor>,
    pub name_id_formats: Vec<String>,
    pub assertion_consumer_services: Vec<Endpoint>,
    pub single_logout_services: Vec<Endpoint>,
    pub want_assertions_signed: Option<bool>,
    pub authn_requests_signed: Option<bool>,
}

impl RoleDescriptor {
    pub(crate) fn new(kind: RoleKind) -> Self {
        Self {
            kind,
            protocol_support: Vec::new(),
            key_descriptors: Vec::new(),
            name_id_formats: Vec::new(),
            assertion_consumer_services: Vec::new(),
            single_logout_services: Vec::new(),
            want_assertions_signed: None,
            authn_requests_signed: None,
        }
    }

    /// Whether this role advertises support for the given protocol namespace.
    #[must_use]
    pub fn supports_protocol(&self, protocol_ns: &str) -> bool {
        self.protocol_support.iter().any(|ns| ns == protocol_ns)
    }
}

/// One federation participant's metadata (`EntityDescriptor`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub entity_id: String,
    /// `validUntil` attribute, if the document bounds its own validity
    pub valid_until: Option<DateTime<Utc>>,
    /// Role descriptors in document order
    pub roles: Vec<RoleDescriptor>,
}

impl EntityDescriptor {
    /// Role descriptors of the given kind supporting the given protocol,
    /// in document order.
    #[must_use]
    pub fn role_descriptors(&self, kind: &RoleKind, protocol_ns: &str) -> Vec<&RoleDescriptor> {
        self.roles
            .iter()
            .filter(|role| &role.kind == kind && role.supports_protocol(protocol_ns))
            .collect()
    }

    /// First SP-SSO role descriptor supporting SAML 2.0, if any.
    ///
    /// Document order is the tie-break when an entity advertises several.
    #[must_use]
    pub fn sp_sso_descriptor(&self) -> Option<&RoleDescriptor> {
        self.role_descriptors(&RoleKind::SpSso, SAML20_PROTOCOL_NS)
            .into_iter()
            .next()
    }
}
