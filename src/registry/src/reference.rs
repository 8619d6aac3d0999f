//! Registry reference construction.
//!
//! Joins caller-supplied registry, repository and tag-or-digest parts into
//! `registry/repository:tag` or `registry/repository@sha256:...`. Hostname and
//! path syntax are not validated here; a bad input surfaces when the
//! reference is turned into a request target.

use std::str::FromStr;

use oci_distribution::Reference;
use oci_mcp_core::error::{OciError, Result};

/// The only digest algorithm accepted in references.
const DIGEST_ALGORITHM: &str = "sha256";

/// Hex length of a sha256 digest.
const SHA256_HEX_LEN: usize = 64;

/// Returns true for `sha256:<64 hex chars>`.
pub fn is_digest(reference: &str) -> bool {
    match reference.split_once(':') {
        Some((algorithm, hex)) => {
            algorithm == DIGEST_ALGORITHM
                && hex.len() == SHA256_HEX_LEN
                && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// What a manifest request is addressed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestRef {
    /// Mutable tag, e.g. `3.22.2`
    Tag(String),
    /// Content digest, e.g. `sha256:abc...`
    Digest(String),
}

impl ManifestRef {
    /// Classify a user-supplied reference string.
    pub fn parse(reference: &str) -> Self {
        if is_digest(reference) {
            ManifestRef::Digest(reference.to_string())
        } else {
            ManifestRef::Tag(reference.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ManifestRef::Tag(tag) => tag,
            ManifestRef::Digest(digest) => digest,
        }
    }
}

/// A registry/repository pair with an optional tag or digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRef {
    /// Registry host, optionally with port (e.g. "ghcr.io", "localhost:5000")
    pub registry: String,
    /// Repository path (e.g. "library/alpine")
    pub repository: String,
    /// Tag or digest; `None` addresses the repository itself (tag listing)
    pub reference: Option<ManifestRef>,
}

impl RegistryRef {
    /// Reference to a manifest by tag or digest.
    pub fn new(
        registry: impl Into<String>,
        repository: impl Into<String>,
        reference: &str,
    ) -> Self {
        Self {
            registry: registry.into(),
            repository: repository.into(),
            reference: Some(ManifestRef::parse(reference)),
        }
    }

    /// Reference to a repository with no tag or digest.
    pub fn repository(registry: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            repository: repository.into(),
            reference: None,
        }
    }

    /// Whether this reference is addressed by digest.
    pub fn is_digest(&self) -> bool {
        matches!(self.reference, Some(ManifestRef::Digest(_)))
    }

    /// The full reference string.
    pub fn full_reference(&self) -> String {
        match &self.reference {
            Some(ManifestRef::Digest(digest)) => {
                format!("{}/{}@{}", self.registry, self.repository, digest)
            }
            Some(ManifestRef::Tag(tag)) => {
                format!("{}/{}:{}", self.registry, self.repository, tag)
            }
            None => format!("{}/{}", self.registry, self.repository),
        }
    }

    /// Resolve into the API endpoint this reference is served from.
    ///
    /// Applies the Docker Hub conventions of `oci-distribution`: `docker.io`
    /// is served from `index.docker.io`, and single-segment repositories
    /// there live under `library/`.
    pub fn endpoint(&self) -> Result<Endpoint> {
        let full = self.full_reference();
        let parsed = Reference::from_str(&full).map_err(|e| OciError::InvalidReference {
            reference: full.clone(),
            message: e.to_string(),
        })?;

        let reference = match &self.reference {
            Some(manifest_ref) => Some(manifest_ref.as_str().to_string()),
            None => None,
        };

        Ok(Endpoint {
            host: parsed.resolve_registry().to_string(),
            repository: parsed.repository().to_string(),
            reference,
        })
    }
}

impl std::fmt::Display for RegistryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_reference())
    }
}

/// A reference resolved to the host and paths of the distribution API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host (and port) serving `/v2/`
    pub host: String,
    /// Normalized repository path
    pub repository: String,
    /// Tag or digest, when addressing a manifest
    pub reference: Option<String>,
}

impl Endpoint {
    /// `/v2/<repository>/manifests/<reference>`
    pub fn manifest_path(&self) -> Option<String> {
        self.reference
            .as_ref()
            .map(|r| format!("/v2/{}/manifests/{}", self.repository, r))
    }

    /// `/v2/<repository>/tags/list`
    pub fn tags_path(&self) -> String {
        format!("/v2/{}/tags/list", self.repository)
    }

    /// Default token scope for pulling from this repository.
    pub fn pull_scope(&self) -> String {
        format!("repository:{}:pull", self.repository)
    }
}
