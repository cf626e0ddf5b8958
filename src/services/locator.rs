//! Metadata resource location and transport
//!
//! Classifies a metadata location string as remote, bundled (classpath) or
//! filesystem, and acquires the raw document bytes over the matching
//! transport. Location classification fails fast: a location that does not
//! exist or is unreadable is a fatal misconfiguration of the registered
//! service, distinct from recoverable parse failures later in the pipeline.

use crate::error::{MetadataError, MetadataResult};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for remote metadata fetches
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Prefix selecting the bundled-resource transport
const CLASSPATH_PREFIX: &str = "classpath:";

/// A classified metadata location with a resolved handle.
///
/// Producing one of these performs no reads beyond an existence and
/// readability check; bytes are acquired separately by
/// [`ResourceTransport::fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataResource {
    /// Network-fetchable metadata document
    Remote(Url),
    /// Resource bundled with the deployment, resolved against the bundle root
    Bundled(PathBuf),
    /// Plain filesystem path
    Filesystem(PathBuf),
}

impl MetadataResource {
    /// Human-readable location for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            MetadataResource::Remote(url) => url.to_string(),
            MetadataResource::Bundled(path) | MetadataResource::Filesystem(path) => {
                path.display().to_string()
            }
        }
    }
}

/// Transport for acquiring metadata documents.
///
/// Owns the HTTP client (bounded timeout, redirects disabled) and the root
/// directory against which `classpath:` locations are resolved. Injected
/// into the metadata service rather than looked up globally.
#[derive(Debug, Clone)]
pub struct ResourceTransport {
    http_client: reqwest::Client,
    bundle_root: PathBuf,
}

impl ResourceTransport {
    /// Create a transport with the default HTTP client.
    #[must_use]
    pub fn new(bundle_root: impl Into<PathBuf>) -> Self {
        // Redirects disabled; bounded timeout so a hung federation
        // endpoint cannot stall service registration.
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(DEFAULT_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(bundle_root, http_client)
    }

    /// Create a transport with a custom HTTP client.
    #[must_use]
    pub fn with_client(bundle_root: impl Into<PathBuf>, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            bundle_root: bundle_root.into(),
        }
    }

    /// Classify a location string and resolve it to a resource handle.
    ///
    /// First match wins: prefix `http` selects the network transport,
    /// prefix `classpath:` the bundled-resource lookup, anything else is a
    /// filesystem path. Local resources must exist and be readable.
    pub fn locate(&self, location: &str) -> MetadataResult<MetadataResource> {
        if location.starts_with("http") {
            let url = Url::parse(location).map_err(|e| {
                MetadataError::Configuration(format!("invalid metadata URL {location}: {e}"))
            })?;
            debug!(location = %location, "Classified metadata location as remote");
            return Ok(MetadataResource::Remote(url));
        }

        let resource = if let Some(relative) = location.strip_prefix(CLASSPATH_PREFIX) {
            let path = self.bundle_root.join(relative);
            check_readable(&path, location)?;
            debug!(location = %location, path = %path.display(), "Classified metadata location as bundled");
            MetadataResource::Bundled(path)
        } else {
            let path = PathBuf::from(location);
            check_readable(&path, location)?;
            debug!(location = %location, "Classified metadata location as filesystem");
            MetadataResource::Filesystem(path)
        };
        Ok(resource)
    }

    /// Acquire the raw bytes of a located metadata document.
    ///
    /// Remote failures (connect error, timeout, non-2xx status) are
    /// configuration errors: at initialization time an unfetchable resource
    /// is indistinguishable from an unreadable one.
    pub async fn fetch(&self, resource: &MetadataResource) -> MetadataResult<Vec<u8>> {
        match resource {
            MetadataResource::Remote(url) => {
                let response =
                    self.http_client.get(url.clone()).send().await.map_err(|e| {
                        MetadataError::Configuration(format!(
                            "failed to fetch metadata from {url}: {e}"
                        ))
                    })?;

                if !response.status().is_success() {
                    return Err(MetadataError::Configuration(format!(
                        "metadata fetch from {url} returned HTTP {}",
                        response.status()
                    )));
                }

                let bytes = response.bytes().await.map_err(|e| {
                    MetadataError::Configuration(format!(
                        "failed to read metadata body from {url}: {e}"
                    ))
                })?;
                Ok(bytes.to_vec())
            }
            MetadataResource::Bundled(path) | MetadataResource::Filesystem(path) => {
                // Read failures after a successful locate are recoverable:
                // the resource existed, the document is what failed.
                let mut bytes = Vec::new();
                File::open(path)
                    .and_then(|mut file| file.read_to_end(&mut bytes))
                    .map_err(|e| {
                        MetadataError::Parse(format!(
                            "failed to read metadata file {}: {e}",
                            path.display()
                        ))
                    })?;
                Ok(bytes)
            }
        }
    }
}

/// Existence and readability check without consuming any bytes.
fn check_readable(path: &Path, location: &str) -> MetadataResult<()> {
    if !path.is_file() {
        return Err(MetadataError::Configuration(format!(
            "metadata resource {location} does not exist"
        )));
    }
    File::open(path).map_err(|e| {
        MetadataError::Configuration(format!("metadata resource {location} is unreadable: {e}"))
    })?;
    Ok(())
}
