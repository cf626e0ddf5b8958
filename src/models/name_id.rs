//! Well-known SAML name-ID format identifiers.

/// Unspecified name-ID format (SAML 1.1)
pub const NAMEID_FORMAT_UNSPECIFIED: &str =
    "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified";
/// Transient name-ID format (SAML 2.0)
pub const NAMEID_FORMAT_TRANSIENT: &str = "urn:oasis:names:tc:SAML:2.0:nameid-format:transient";
/// Email address name-ID format (SAML 1.1)
pub const NAMEID_FORMAT_EMAIL: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress";
/// Persistent name-ID format (SAML 2.0)
pub const NAMEID_FORMAT_PERSISTENT: &str = "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent";

/// Name-ID formats a newly registered service advertises by default.
///
/// Order matters: consumers treat the first mutually supported format as
/// preferred.
#[must_use]
pub fn default_name_formats() -> Vec<String> {
    vec![
        NAMEID_FORMAT_UNSPECIFIED.to_string(),
        NAMEID_FORMAT_TRANSIENT.to_string(),
        NAMEID_FORMAT_EMAIL.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_formats_exact_order() {
        let formats = default_name_formats();
        assert_eq!(
            formats,
            vec![
                NAMEID_FORMAT_UNSPECIFIED,
                NAMEID_FORMAT_TRANSIENT,
                NAMEID_FORMAT_EMAIL,
            ]
        );
    }
}
