//! SP trust metadata service
//!
//! Owns the load pipeline (locate, parse, build, chain) for one registered
//! service and answers the descriptor queries request handlers issue during
//! SSO. Loading runs off the request hot path; queries are lock-free reads
//! of the current resolver chain.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{RoleDescriptor, SamlRegisteredService, SigningCredential};
use crate::services::chain::ChainingMetadataResolver;
use crate::services::locator::{MetadataResource, ResourceTransport};
use crate::services::parser::XmlParserPool;
use crate::services::resolver::DomMetadataResolver;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Trust metadata manager for one SAML registered service.
///
/// Construction takes the persisted service record plus the two injected
/// collaborators (resource transport, parser pool). [`SpMetadata::initialize`]
/// runs the load pipeline once; [`SpMetadata::reload`] re-runs it and swaps
/// the resolver chain atomically. Readers always observe either the previous
/// or the new chain, never a partially built one.
pub struct SpMetadata {
    service: SamlRegisteredService,
    transport: ResourceTransport,
    parser_pool: XmlParserPool,
    signing_credential: Option<Arc<SigningCredential>>,
    chain: ArcSwapOption<ChainingMetadataResolver>,
    /// Guards only the chain replacement; queries never take it.
    swap_lock: Mutex<()>,
}

impl SpMetadata {
    #[must_use]
    pub fn new(
        service: SamlRegisteredService,
        transport: ResourceTransport,
        parser_pool: XmlParserPool,
    ) -> Self {
        Self {
            service,
            transport,
            parser_pool,
            signing_credential: None,
            chain: ArcSwapOption::empty(),
            swap_lock: Mutex::new(()),
        }
    }

    /// Attach the IdP signing credential shared by the key-management layer.
    #[must_use]
    pub fn with_signing_credential(mut self, credential: Arc<SigningCredential>) -> Self {
        self.signing_credential = Some(credential);
        self
    }

    /// Run the load pipeline for the first time.
    ///
    /// An unclassifiable, missing or unfetchable metadata location is a
    /// fatal configuration error and the owning registry should refuse to
    /// activate the service. A document that fetches but fails to parse or
    /// validate is logged and the service degrades to an empty chain:
    /// every subsequent query returns `EntityNotFound`.
    pub async fn initialize(&self) -> MetadataResult<()> {
        self.load().await
    }

    /// Re-run the load pipeline and atomically swap in the new chain.
    pub async fn reload(&self) -> MetadataResult<()> {
        self.load().await
    }

    async fn load(&self) -> MetadataResult<()> {
        let location = self.transport.locate(self.service.metadata_location())?;
        debug!(location = %location.describe(), "Loading SP metadata");

        let resolvers = match self.transport.fetch(&location).await {
            Ok(bytes) => self.build_resolvers(&bytes, &location),
            Err(err @ MetadataError::Configuration(_)) => return Err(err),
            Err(err) => {
                warn!(
                    location = %location.describe(),
                    error = %err,
                    "Could not read metadata resource, continuing without it"
                );
                Vec::new()
            }
        };

        let chain = ChainingMetadataResolver::new(resolvers);
        info!(
            location = %location.describe(),
            resolvers = chain.len(),
            "SP metadata resolver chain installed"
        );
        self.install(chain);
        Ok(())
    }

    /// Parse the document and build the single-document resolver.
    ///
    /// Both steps degrade on failure: the resolver is dropped from the
    /// result set and the rest of the pipeline proceeds with whatever is
    /// left, which may be nothing.
    fn build_resolvers(
        &self,
        bytes: &[u8],
        location: &MetadataResource,
    ) -> Vec<DomMetadataResolver> {
        let document = match self.parser_pool.parse(bytes) {
            Ok(document) => document,
            Err(err) => {
                warn!(
                    location = %location.describe(),
                    error = %err,
                    "Could not parse metadata document, continuing without it"
                );
                return Vec::new();
            }
        };

        let resolver_id = format!("dom-metadata-resolver:{}", self.service.metadata_location());
        match DomMetadataResolver::initialize(document, resolver_id) {
            Ok(resolver) => {
                debug!(
                    resolver_id = %resolver.id(),
                    entities = resolver.entity_count(),
                    "Initialized metadata resolver"
                );
                vec![resolver]
            }
            Err(err) => {
                warn!(
                    location = %location.describe(),
                    error = %err,
                    "Could not initialize metadata resolver, resource will be ignored"
                );
                Vec::new()
            }
        }
    }

    fn install(&self, chain: ChainingMetadataResolver) {
        let chain = Arc::new(chain);
        let _guard = self.swap_lock.lock();
        self.chain.store(Some(chain));
    }

    /// Resolve the SP-SSO role descriptor for the given entity ID.
    ///
    /// Read-only and safe to call concurrently with a reload. Absence of the
    /// entity, absence of a SAML 2.0 SP-SSO role on it, and a never-loaded
    /// or degraded chain all surface as `EntityNotFound`.
    pub fn role_descriptor(&self, entity_id: &str) -> MetadataResult<RoleDescriptor> {
        let chain = self
            .chain
            .load_full()
            .ok_or_else(|| MetadataError::EntityNotFound(entity_id.to_string()))?;

        let entity = chain.resolve_single(entity_id)?;
        entity
            .sp_sso_descriptor()
            .cloned()
            .ok_or_else(|| MetadataError::EntityNotFound(entity_id.to_string()))
    }

    #[must_use]
    pub fn service(&self) -> &SamlRegisteredService {
        &self.service
    }

    #[must_use]
    pub fn supported_name_formats(&self) -> &[String] {
        self.service.supported_name_formats()
    }

    #[must_use]
    pub fn is_sign_assertions(&self) -> bool {
        self.service.is_sign_assertions()
    }

    #[must_use]
    pub fn signing_credential(&self) -> Option<Arc<SigningCredential>> {
        self.signing_credential.clone()
    }

    /// Whether a chain (possibly empty) has been installed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.chain.load().is_some()
    }

    /// Number of usable resolvers in the current chain.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.chain.load().as_ref().map_or(0, |chain| chain.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const SP_ENTITY: &str = "https://sp.example.org";

    fn sp_metadata_xml(entity_id: &str) -> String {
        format!(
            r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="{entity_id}">
  <md:SPSSODescriptor protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
    <md:AssertionConsumerService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST"
        Location="https://sp.example.org/saml/acs" index="0" isDefault="true"/>
  </md:SPSSODescriptor>
</md:EntityDescriptor>"#
        )
    }

    fn metadata_for(location: &str, bundle_root: &Path) -> SpMetadata {
        SpMetadata::new(
            SamlRegisteredService::new(location),
            ResourceTransport::new(bundle_root),
            XmlParserPool::new(),
        )
    }

    #[tokio::test]
    async fn test_initialize_from_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sp.xml");
        std::fs::write(&path, sp_metadata_xml(SP_ENTITY)).unwrap();

        let metadata = metadata_for(path.to_str().unwrap(), dir.path());
        metadata.initialize().await.unwrap();

        assert!(metadata.is_loaded());
        assert_eq!(metadata.resolver_count(), 1);
        let role = metadata.role_descriptor(SP_ENTITY).unwrap();
        assert_eq!(role.assertion_consumer_services.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_location_aborts_initialization() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = metadata_for("classpath:missing.xml", dir.path());

        let err = metadata.initialize().await.unwrap_err();
        assert!(err.is_fatal());
        assert!(!metadata.is_loaded());
    }

    #[tokio::test]
    async fn test_malformed_document_degrades_to_empty_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sp.xml");
        std::fs::write(&path, "this is not xml <<<").unwrap();

        let metadata = metadata_for(path.to_str().unwrap(), dir.path());
        metadata.initialize().await.unwrap();

        assert!(metadata.is_loaded());
        assert_eq!(metadata.resolver_count(), 0);
        let err = metadata.role_descriptor(SP_ENTITY).unwrap_err();
        assert!(matches!(err, MetadataError::EntityNotFound(_)));
        // Degraded state is idempotent
        let err = metadata.role_descriptor(SP_ENTITY).unwrap_err();
        assert!(matches!(err, MetadataError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn test_query_before_initialize_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sp.xml");
        std::fs::write(&path, sp_metadata_xml(SP_ENTITY)).unwrap();

        let metadata = metadata_for(path.to_str().unwrap(), dir.path());
        let err = metadata.role_descriptor(SP_ENTITY).unwrap_err();
        assert!(matches!(err, MetadataError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn test_entity_without_sp_role_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idp.xml");
        std::fs::write(
            &path,
            r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example.org">
  <md:IDPSSODescriptor protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol"/>
</md:EntityDescriptor>"#,
        )
        .unwrap();

        let metadata = metadata_for(path.to_str().unwrap(), dir.path());
        metadata.initialize().await.unwrap();

        let err = metadata.role_descriptor("https://idp.example.org").unwrap_err();
        assert!(matches!(err, MetadataError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn test_signing_credential_is_shared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sp.xml");
        std::fs::write(&path, sp_metadata_xml(SP_ENTITY)).unwrap();

        let credential = Arc::new(SigningCredential::new("key-1", "-----BEGIN CERTIFICATE-----"));
        let metadata =
            metadata_for(path.to_str().unwrap(), dir.path()).with_signing_credential(credential.clone());

        let borrowed = metadata.signing_credential().unwrap();
        assert!(Arc::ptr_eq(&borrowed, &credential));
    }
}
