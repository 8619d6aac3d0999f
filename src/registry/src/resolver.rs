//! Manifest resolution without schema enforcement.

use oci_mcp_core::error::Result;

use crate::auth::Credentials;
use crate::manifest::{FetchedManifest, ManifestDocument, ACCEPTED_MEDIA_TYPES};
use crate::reference::RegistryRef;
use crate::transport::{RegistryResponse, RegistryTransport};

/// Registry-specific content digest header.
pub const DOCKER_CONTENT_DIGEST: &str = "Docker-Content-Digest";

/// Generic content digest header.
pub const OCI_CONTENT_DIGEST: &str = "OCI-Content-Digest";

/// Digest from response headers, `Docker-Content-Digest` first.
///
/// Absence is not an error.
pub fn digest_from_headers(response: &RegistryResponse) -> Option<String> {
    response
        .header(DOCKER_CONTENT_DIGEST)
        .or_else(|| response.header(OCI_CONTENT_DIGEST))
        .map(str::to_string)
}

/// Fetches manifests and indexes, returning the document and its digest.
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    transport: RegistryTransport,
}

impl ManifestResolver {
    pub fn new(transport: RegistryTransport) -> Self {
        Self { transport }
    }

    /// Fetch the manifest or index addressed by `target`.
    ///
    /// The body only has to be a JSON object; it is not checked against the
    /// image manifest or index schemas. Use [`FetchedManifest::validate`] for
    /// that.
    pub async fn resolve(
        &self,
        target: &RegistryRef,
        credentials: Option<&Credentials>,
    ) -> Result<FetchedManifest> {
        tracing::debug!(
            reference = %target,
            authenticated = credentials.is_some(),
            "Fetching manifest"
        );

        let response = self
            .transport
            .authenticated_request(target, credentials, ACCEPTED_MEDIA_TYPES)
            .await?;

        let document = ManifestDocument::from_slice(&target.full_reference(), &response.body)?;
        let digest = digest_from_headers(&response);
        if digest.is_none() {
            tracing::debug!(reference = %target, "Registry sent no content digest header");
        }

        let fetched = FetchedManifest {
            document,
            digest,
            content_type: response.content_type().map(str::to_string),
            raw: response.body,
        };
        tracing::debug!(
            reference = %target,
            content_type = fetched.content_type.as_deref().unwrap_or("-"),
            media_type = fetched.document.media_type.as_deref().unwrap_or("-"),
            "Fetched manifest"
        );
        Ok(fetched)
    }
}
