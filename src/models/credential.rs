//! Signing credential reference
//!
//! The credential itself is owned by the key-management layer; the metadata
//! service only holds a shared reference to it.

/// An IdP signing credential: key identifier plus PEM certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningCredential {
    key_id: String,
    certificate_pem: String,
}

impl SigningCredential {
    #[must_use]
    pub fn new(key_id: impl Into<String>, certificate_pem: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            certificate_pem: certificate_pem.into(),
        }
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    #[must_use]
    pub fn certificate_pem(&self) -> &str {
        &self.certificate_pem
    }
}
