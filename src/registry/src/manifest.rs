//! Manifest documents as returned by registries.
//!
//! Parsing is lenient: every field is optional and unknown fields are
//! ignored, so multi-platform indexes without a `config` parse fine. Strict
//! conformance checking lives in [`FetchedManifest::validate`] and is never
//! run by the fetch path.

use std::collections::BTreeMap;

use oci_distribution::manifest::{
    OciManifest, IMAGE_MANIFEST_LIST_MEDIA_TYPE, IMAGE_MANIFEST_MEDIA_TYPE,
    OCI_IMAGE_INDEX_MEDIA_TYPE, OCI_IMAGE_MEDIA_TYPE,
};
use oci_mcp_core::error::{OciError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Media types sent in the `Accept` header of manifest requests.
///
/// Both OCI and legacy Docker types, index and single-image.
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &[
    OCI_IMAGE_INDEX_MEDIA_TYPE,
    IMAGE_MANIFEST_LIST_MEDIA_TYPE,
    OCI_IMAGE_MEDIA_TYPE,
    IMAGE_MANIFEST_MEDIA_TYPE,
];

/// Platform of one index entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    #[serde(default, deserialize_with = "string_or_none")]
    pub architecture: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub os: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub variant: Option<String>,
    #[serde(default, rename = "os.version", deserialize_with = "string_or_none")]
    pub os_version: Option<String>,
}

/// One entry of an image index / manifest list. Only the platform is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(default, deserialize_with = "object_or_none")]
    pub platform: Option<Platform>,
}

/// A manifest or index body, parsed without schema enforcement.
///
/// A field holding an unexpected JSON type reads as absent; it never fails
/// the parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    #[serde(default, deserialize_with = "string_or_none")]
    pub media_type: Option<String>,
    /// Present on index documents only. Entries that are not objects are dropped.
    #[serde(default, deserialize_with = "object_entries")]
    pub manifests: Vec<IndexEntry>,
    /// String-valued annotations; other values are dropped.
    #[serde(default, deserialize_with = "string_map")]
    pub annotations: BTreeMap<String, String>,
    /// Present on some single-image manifests.
    #[serde(default, deserialize_with = "string_or_none")]
    pub architecture: Option<String>,
    /// Digest embedded in the body by some registries. Not computed by us.
    #[serde(default, deserialize_with = "string_or_none")]
    pub digest: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn object_or_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

fn object_entries<'de, D>(deserializer: D) -> std::result::Result<Vec<IndexEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn string_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(value) => Some((key, value)),
                _ => None,
            })
            .collect(),
        _ => BTreeMap::new(),
    })
}

/// Shape of a manifest document, decided from its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestKind<'a> {
    /// Multi-platform index or Docker manifest list
    Index(&'a [IndexEntry]),
    /// Single-image manifest, with its top-level architecture if present
    Image(Option<&'a str>),
    /// Unrecognized or missing media type
    Unknown,
}

impl ManifestDocument {
    /// Parse a response body.
    pub fn from_slice(reference: &str, body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| OciError::MalformedManifest {
            reference: reference.to_string(),
            message: e.to_string(),
        })
    }

    /// Classify by case-insensitive substring match on the media type.
    ///
    /// Substring rather than equality, since registries emit vendor-suffixed
    /// types. Index markers are checked first.
    pub fn kind(&self) -> ManifestKind<'_> {
        let media_type = self
            .media_type
            .as_deref()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if media_type.contains("image.index") || media_type.contains("manifest.list") {
            ManifestKind::Index(&self.manifests)
        } else if media_type.contains("image.manifest") {
            ManifestKind::Image(self.architecture.as_deref())
        } else {
            ManifestKind::Unknown
        }
    }

    /// The body-embedded digest, if any. Best-effort only.
    pub fn embedded_digest(&self) -> Option<&str> {
        self.digest.as_deref().filter(|d| !d.is_empty())
    }
}

/// A manifest as fetched: parsed document, transport digest and raw body.
#[derive(Debug, Clone)]
pub struct FetchedManifest {
    pub document: ManifestDocument,
    /// Digest from the response headers; `None` when the registry sent none
    pub digest: Option<String>,
    /// `Content-Type` of the response, if sent
    pub content_type: Option<String>,
    /// Raw response body
    pub raw: Vec<u8>,
}

impl FetchedManifest {
    /// Header digest, falling back to the body-embedded one.
    pub fn best_digest(&self) -> Option<String> {
        self.digest
            .clone()
            .or_else(|| self.document.embedded_digest().map(str::to_string))
    }

    /// Opt-in strict validation against the OCI image manifest / index types.
    ///
    /// Rejects documents the lenient parse accepts, e.g. an image manifest
    /// without `config` or an index without `manifests`.
    pub fn validate(&self) -> Result<OciManifest> {
        let value: serde_json::Value = serde_json::from_slice(&self.raw)
            .map_err(|e| OciError::SchemaValidation(e.to_string()))?;

        match self.document.kind() {
            ManifestKind::Index(_) if value.get("manifests").is_none() => {
                return Err(OciError::SchemaValidation(
                    "index document has no manifests field".to_string(),
                ));
            }
            ManifestKind::Image(_) if value.get("config").is_none() => {
                return Err(OciError::SchemaValidation(
                    "image manifest has no config field".to_string(),
                ));
            }
            _ => {}
        }

        serde_json::from_value(value).map_err(|e| OciError::SchemaValidation(e.to_string()))
    }
}
