//! OCI registry client.
//!
//! Resolves repository tags and manifest metadata without enforcing
//! manifest schemas, so multi-platform indexes that lack a single-image
//! `config` are accepted.
//!
//! # Flow
//!
//! ```text
//! registry + repository + reference + credentials?
//!        │
//!        ▼
//!   RegistryRef ──► RegistryTransport ──► ManifestResolver ──► extract_architectures
//!  (tag or digest)   (login, challenge)    (document, digest)    (sorted, deduplicated)
//!                                                  │
//!                                                  ▼
//!                              ResolutionResult { digest, annotations, architectures }
//! ```
//!
//! Everything is request-scoped: no tokens, credentials or manifests are
//! cached between calls.

pub mod architecture;
pub mod auth;
pub mod client;
pub mod manifest;
pub mod reference;
pub mod resolver;
pub mod tags;
pub mod transport;

pub use architecture::extract_architectures;
pub use auth::{AuthChallenge, Credentials};
pub use client::{RegistryClient, ResolutionResult};
pub use manifest::{
    FetchedManifest, IndexEntry, ManifestDocument, ManifestKind, Platform, ACCEPTED_MEDIA_TYPES,
};
pub use oci_mcp_core::config::ClientOptions;
pub use reference::{is_digest, Endpoint, ManifestRef, RegistryRef};
pub use resolver::{digest_from_headers, ManifestResolver};
pub use tags::TagLister;
pub use transport::{RegistryResponse, RegistrySession, RegistryTransport};
