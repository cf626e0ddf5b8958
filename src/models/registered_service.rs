//! Persisted configuration of a SAML registered service
//!
//! Only the configuration is serializable; the resolver chain and resource
//! handle derived from it are runtime state and live in
//! [`crate::services::SpMetadata`].

use crate::models::name_id::default_name_formats;
use serde::{Deserialize, Serialize};

/// Configuration record for one SP registered with the IdP.
///
/// The metadata location is immutable after construction; everything derived
/// from it (the resolver chain) is rebuilt on reload instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamlRegisteredService {
    metadata_location: String,
    #[serde(default = "default_name_formats")]
    supported_name_formats: Vec<String>,
    #[serde(default)]
    sign_assertions: bool,
}

impl SamlRegisteredService {
    /// Create a service record pointing at the given metadata location.
    ///
    /// Seeds the name-ID format allow-list with the three well-known
    /// defaults (unspecified, transient, email).
    #[must_use]
    pub fn new(metadata_location: impl Into<String>) -> Self {
        Self {
            metadata_location: metadata_location.into(),
            supported_name_formats: default_name_formats(),
            sign_assertions: false,
        }
    }

    /// Replace the advertised name-ID formats.
    ///
    /// An empty list is legal but degraded: it advertises no supported
    /// formats at all.
    #[must_use]
    pub fn with_supported_name_formats(mut self, formats: Vec<String>) -> Self {
        self.supported_name_formats = formats;
        self
    }

    #[must_use]
    pub fn with_sign_assertions(mut self, sign_assertions: bool) -> Self {
        self.sign_assertions = sign_assertions;
        self
    }

    #[must_use]
    pub fn metadata_location(&self) -> &str {
        &self.metadata_location
    }

    #[must_use]
    pub fn supported_name_formats(&self) -> &[String] {
        &self.supported_name_formats
    }

    #[must_use]
    pub fn is_sign_assertions(&self) -> bool {
        self.sign_assertions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::name_id::{
        NAMEID_FORMAT_EMAIL, NAMEID_FORMAT_TRANSIENT, NAMEID_FORMAT_UNSPECIFIED,
    };

    #[test]
    fn test_defaults() {
        let service = SamlRegisteredService::new("classpath:sp-metadata.xml");
        assert_eq!(service.metadata_location(), "classpath:sp-metadata.xml");
        assert_eq!(
            service.supported_name_formats(),
            &[
                NAMEID_FORMAT_UNSPECIFIED.to_string(),
                NAMEID_FORMAT_TRANSIENT.to_string(),
                NAMEID_FORMAT_EMAIL.to_string(),
            ]
        );
        assert!(!service.is_sign_assertions());
    }

    #[test]
    fn test_serde_round_trip() {
        let service = SamlRegisteredService::new("https://sp.example.org/metadata")
            .with_sign_assertions(true)
            .with_supported_name_formats(vec![NAMEID_FORMAT_EMAIL.to_string()]);

        let json = serde_json::to_string(&service).unwrap();
        let back: SamlRegisteredService = serde_json::from_str(&json).unwrap();
        assert_eq!(back, service);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let service: SamlRegisteredService =
            serde_json::from_str(r#"{"metadata_location": "/etc/idp/sp.xml"}"#).unwrap();
        assert_eq!(service.supported_name_formats().len(), 3);
        assert!(!service.is_sign_assertions());
    }
}
