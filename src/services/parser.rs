//! Hardened SAML metadata XML parsing
//!
//! A shared, cheap-to-clone parser configuration that turns raw metadata
//! bytes into entity descriptors. DOCTYPE declarations are rejected outright
//! (no DTD processing, no entity expansion) and document size is bounded
//! before any parsing happens.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{
    Endpoint, EntityDescriptor, KeyDescriptor, RoleDescriptor, RoleKind, SAML20_METADATA_NS,
};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

/// Maximum accepted metadata document size (10 MB)
const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// A parsed metadata document: the entity descriptors of the root
/// `EntityDescriptor`, or all descriptors of an `EntitiesDescriptor`
/// container (recursively), in document order.
#[derive(Debug, Clone)]
pub struct MetadataDocument {
    pub entities: Vec<EntityDescriptor>,
}

/// Shared, injection-hardened XML parser for federation metadata.
///
/// Clones share the same configuration; the pool is handed to the metadata
/// service by its constructor, never looked up through a global.
#[derive(Debug, Clone)]
pub struct XmlParserPool {
    max_document_size: usize,
}

impl Default for XmlParserPool {
    fn default() -> Self {
        Self {
            max_document_size: MAX_DOCUMENT_SIZE,
        }
    }
}

impl XmlParserPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the maximum accepted document size.
    #[must_use]
    pub fn with_max_document_size(mut self, max_document_size: usize) -> Self {
        self.max_document_size = max_document_size;
        self
    }

    /// Parse raw metadata bytes into a document.
    ///
    /// Any failure here is a recoverable [`MetadataError::Parse`]: the
    /// caller logs it and degrades to an empty resolver chain rather than
    /// failing service activation.
    pub fn parse(&self, bytes: &[u8]) -> MetadataResult<MetadataDocument> {
        if bytes.len() > self.max_document_size {
            return Err(MetadataError::Parse(format!(
                "metadata document exceeds maximum size ({} > {} bytes)",
                bytes.len(),
                self.max_document_size
            )));
        }

        let xml = std::str::from_utf8(bytes)
            .map_err(|e| MetadataError::Parse(format!("metadata is not valid UTF-8: {e}")))?;

        parse_document(xml)
    }
}

fn parse_document(xml: &str) -> MetadataResult<MetadataDocument> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entities: Vec<EntityDescriptor> = Vec::new();
    let mut current_entity: Option<EntityDescriptor> = None;
    let mut current_role: Option<RoleDescriptor> = None;
    let mut current_key: Option<KeyDescriptor> = None;
    let mut in_name_id_format = false;
    let mut in_x509_certificate = false;
    let mut root_seen = false;

    loop {
        match reader.read_resolved_event() {
            Ok((_, Event::DocType(_))) => {
                return Err(MetadataError::Parse(
                    "DOCTYPE declarations are prohibited in SAML metadata".to_string(),
                ));
            }
            Ok((ns, event @ (Event::Start(_) | Event::Empty(_)))) => {
                let self_closing = matches!(&event, Event::Empty(_));
                let e = match event {
                    Event::Start(e) | Event::Empty(e) => e,
                    _ => unreachable!(),
                };
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref()).unwrap_or("");

                if !root_seen {
                    root_seen = true;
                    let in_md_ns = matches!(
                        &ns,
                        ResolveResult::Bound(bound) if bound.0 == SAML20_METADATA_NS.as_bytes()
                    );
                    if !in_md_ns || (name != "EntityDescriptor" && name != "EntitiesDescriptor") {
                        return Err(MetadataError::Parse(format!(
                            "unexpected root element {name}, expected EntityDescriptor or EntitiesDescriptor in {SAML20_METADATA_NS}"
                        )));
                    }
                }

                match name {
                    "EntitiesDescriptor" => {}
                    "EntityDescriptor" => {
                        if current_entity.is_some() {
                            return Err(MetadataError::Parse(
                                "EntityDescriptor elements cannot nest".to_string(),
                            ));
                        }
                        let entity = parse_entity_start(&e)?;
                        if self_closing {
                            entities.push(entity);
                        } else {
                            current_entity = Some(entity);
                        }
                    }
                    "SPSSODescriptor" | "IDPSSODescriptor" | "AttributeAuthorityDescriptor"
                    | "AuthnAuthorityDescriptor" | "PDPDescriptor" | "RoleDescriptor"
                        if current_entity.is_some() && current_role.is_none() =>
                    {
                        let role = parse_role_start(name, &e);
                        if self_closing {
                            if let Some(entity) = current_entity.as_mut() {
                                entity.roles.push(role);
                            }
                        } else {
                            current_role = Some(role);
                        }
                    }
                    "KeyDescriptor" if current_role.is_some() => {
                        let key = parse_key_start(&e);
                        if self_closing {
                            if let Some(role) = current_role.as_mut() {
                                role.key_descriptors.push(key);
                            }
                        } else {
                            current_key = Some(key);
                        }
                    }
                    "X509Certificate" if current_key.is_some() && !self_closing => {
                        in_x509_certificate = true;
                    }
                    "NameIDFormat" if current_role.is_some() && !self_closing => {
                        in_name_id_format = true;
                    }
                    "AssertionConsumerService" => {
                        if let Some(role) = current_role.as_mut() {
                            role.assertion_consumer_services.push(parse_endpoint(&e));
                        }
                    }
                    "SingleLogoutService" => {
                        if let Some(role) = current_role.as_mut() {
                            role.single_logout_services.push(parse_endpoint(&e));
                        }
                    }
                    _ => {}
                }
            }
            Ok((_, Event::Text(e))) => {
                let text = e.unescape().unwrap_or_default();
                if in_x509_certificate {
                    if let Some(key) = current_key.as_mut() {
                        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                        match key.certificate.as_mut() {
                            Some(existing) => existing.push_str(&compact),
                            None => key.certificate = Some(compact),
                        }
                    }
                } else if in_name_id_format {
                    if let Some(role) = current_role.as_mut() {
                        role.name_id_formats.push(text.to_string());
                    }
                }
            }
            Ok((_, Event::End(e))) => {
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref()).unwrap_or("");
                match name {
                    "EntityDescriptor" => {
                        if let Some(entity) = current_entity.take() {
                            entities.push(entity);
                        }
                    }
                    "SPSSODescriptor" | "IDPSSODescriptor" | "AttributeAuthorityDescriptor"
                    | "AuthnAuthorityDescriptor" | "PDPDescriptor" | "RoleDescriptor" => {
                        if let (Some(entity), Some(role)) =
                            (current_entity.as_mut(), current_role.take())
                        {
                            entity.roles.push(role);
                        }
                    }
                    "KeyDescriptor" => {
                        if let (Some(role), Some(key)) = (current_role.as_mut(), current_key.take())
                        {
                            role.key_descriptors.push(key);
                        }
                    }
                    "X509Certificate" => in_x509_certificate = false,
                    "NameIDFormat" => in_name_id_format = false,
                    _ => {}
                }
            }
            Ok((_, Event::Eof)) => break,
            Err(e) => {
                return Err(MetadataError::Parse(format!("XML parse error: {e}")));
            }
            _ => {}
        }
    }

    if entities.is_empty() {
        return Err(MetadataError::Parse(
            "metadata document contains no EntityDescriptor".to_string(),
        ));
    }

    Ok(MetadataDocument { entities })
}

fn parse_entity_start(e: &BytesStart<'_>) -> MetadataResult<EntityDescriptor> {
    let mut entity_id = String::new();
    let mut valid_until: Option<DateTime<Utc>> = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
        let value = attr.unescape_value().unwrap_or_default();
        match key {
            "entityID" => entity_id = value.to_string(),
            "validUntil" => {
                let parsed = DateTime::parse_from_rfc3339(&value).map_err(|err| {
                    MetadataError::Parse(format!("invalid validUntil {value}: {err}"))
                })?;
                valid_until = Some(parsed.with_timezone(&Utc));
            }
            _ => {}
        }
    }

    Ok(EntityDescriptor {
        entity_id,
        valid_until,
        roles: Vec::new(),
    })
}

fn parse_role_start(name: &str, e: &BytesStart<'_>) -> RoleDescriptor {
    let kind = match name {
        "SPSSODescriptor" => RoleKind::SpSso,
        "IDPSSODescriptor" => RoleKind::IdpSso,
        other => RoleKind::Other(other.to_string()),
    };
    let mut role = RoleDescriptor::new(kind);

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
        let value = attr.unescape_value().unwrap_or_default();
        match key {
            "protocolSupportEnumeration" => {
                role.protocol_support =
                    value.split_whitespace().map(ToString::to_string).collect();
            }
            "WantAssertionsSigned" => role.want_assertions_signed = Some(parse_bool(&value)),
            "AuthnRequestsSigned" => role.authn_requests_signed = Some(parse_bool(&value)),
            _ => {}
        }
    }
    role
}

fn parse_key_start(e: &BytesStart<'_>) -> KeyDescriptor {
    let mut key_use = None;
    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
        if key == "use" {
            key_use = Some(attr.unescape_value().unwrap_or_default().to_string());
        }
    }
    KeyDescriptor {
        key_use,
        certificate: None,
    }
}

fn parse_endpoint(e: &BytesStart<'_>) -> Endpoint {
    let mut binding = String::new();
    let mut location = String::new();
    let mut index = None;
    let mut is_default = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
        let value = attr.unescape_value().unwrap_or_default();
        match key {
            "Binding" => binding = value.to_string(),
            "Location" => location = value.to_string(),
            "index" => index = value.parse().ok(),
            "isDefault" => is_default = parse_bool(&value),
            _ => {}
        }
    }

    Endpoint {
        binding,
        location,
        index,
        is_default,
    }
}

fn parse_bool(value: &str) -> bool {
    value == "true" || value == "1"
}
