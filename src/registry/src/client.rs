//! Registry client: tag listing and manifest details.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use oci_mcp_core::config::ClientOptions;
use oci_mcp_core::error::Result;

use crate::architecture::extract_architectures;
use crate::auth::Credentials;
use crate::manifest::FetchedManifest;
use crate::reference::RegistryRef;
use crate::resolver::ManifestResolver;
use crate::tags::TagLister;
use crate::transport::RegistryTransport;

/// Digest, annotations and architectures of a tag or digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Content digest; `None` when neither headers nor body carried one
    pub digest: Option<String>,
    /// Top-level annotations of the manifest or index
    pub annotations: BTreeMap<String, String>,
    /// Supported architectures, sorted ascending and deduplicated
    pub architectures: Vec<String>,
}

impl ResolutionResult {
    /// Assemble the result from a fetched manifest.
    pub fn from_manifest(manifest: &FetchedManifest) -> Self {
        Self {
            digest: manifest.best_digest(),
            annotations: manifest.document.annotations.clone(),
            architectures: extract_architectures(&manifest.document),
        }
    }
}

/// Stateless registry client.
///
/// Holds only the shared HTTP client and options; every call builds its
/// own reference and authentication context.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    resolver: ManifestResolver,
    tags: TagLister,
}

impl RegistryClient {
    /// Create a client from options.
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let transport = RegistryTransport::new(options)?;
        Ok(Self {
            resolver: ManifestResolver::new(transport.clone()),
            tags: TagLister::new(transport),
        })
    }

    /// List all tags of `registry/repository`.
    pub async fn list_tags(
        &self,
        registry: &str,
        repository: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Vec<String>> {
        tracing::info!(
            registry = %registry,
            repository = %repository,
            authenticated = credentials.is_some(),
            "Listing tags"
        );
        self.tags.list_tags(registry, repository, credentials).await
    }

    /// Fetch the manifest for a tag or digest without schema enforcement.
    pub async fn resolve_manifest(
        &self,
        registry: &str,
        repository: &str,
        reference: &str,
        credentials: Option<&Credentials>,
    ) -> Result<FetchedManifest> {
        let target = RegistryRef::new(registry, repository, reference);
        self.resolver.resolve(&target, credentials).await
    }

    /// Digest, annotations and architectures of a tag or digest.
    ///
    /// A failed fetch fails the whole call; no partial result is returned.
    pub async fn get_details(
        &self,
        registry: &str,
        repository: &str,
        reference: &str,
        credentials: Option<&Credentials>,
    ) -> Result<ResolutionResult> {
        tracing::info!(
            registry = %registry,
            repository = %repository,
            reference = %reference,
            authenticated = credentials.is_some(),
            "Resolving manifest details"
        );

        let manifest = self
            .resolve_manifest(registry, repository, reference, credentials)
            .await?;
        let result = ResolutionResult::from_manifest(&manifest);

        tracing::debug!(
            digest = ?result.digest,
            architectures = ?result.architectures,
            "Resolved manifest details"
        );
        Ok(result)
    }
}
