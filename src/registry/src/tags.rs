//! Repository tag listing.

use serde::Deserialize;

use oci_mcp_core::error::{OciError, Result};

use crate::auth::Credentials;
use crate::reference::RegistryRef;
use crate::transport::RegistryTransport;

/// Upper bound on followed `Link` pages, against registries that loop.
const MAX_PAGES: usize = 1000;

/// Body of `GET /v2/<name>/tags/list`.
#[derive(Debug, Deserialize)]
struct TagPage {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Lists the tags of a repository.
#[derive(Debug, Clone)]
pub struct TagLister {
    transport: RegistryTransport,
}

impl TagLister {
    pub fn new(transport: RegistryTransport) -> Self {
        Self { transport }
    }

    /// All tags of `registry/repository`, in registry order.
    ///
    /// Follows `Link: <...>; rel="next"` pagination. Tags are neither sorted
    /// nor deduplicated. An empty repository yields an empty list.
    pub async fn list_tags(
        &self,
        registry: &str,
        repository: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Vec<String>> {
        let target = RegistryRef::repository(registry, repository);
        let mut session = self.transport.session(&target, credentials)?;
        if credentials.is_some() {
            session.login().await?;
        }

        let mut url = session.url(&session.endpoint().tags_path())?;
        let mut tags = Vec::new();

        for page in 0..MAX_PAGES {
            let response = session.get(url.clone(), &["application/json"]).await?;
            let body: TagPage =
                serde_json::from_slice(&response.body).map_err(|e| OciError::FetchFailed {
                    reference: target.full_reference(),
                    status: Some(response.status),
                    message: format!("invalid tag list response: {}", e),
                })?;
            tags.extend(body.tags.unwrap_or_default());

            let Some(next) = response.next_link() else {
                tracing::debug!(
                    reference = %target,
                    pages = page + 1,
                    count = tags.len(),
                    "Listed tags"
                );
                return Ok(tags);
            };

            let next_url = session.url(&next)?;
            if next_url == url {
                tracing::warn!(reference = %target, link = %next, "Tag pagination link repeats itself");
                return Ok(tags);
            }
            url = next_url;
        }

        tracing::warn!(reference = %target, pages = MAX_PAGES, "Tag pagination limit reached");
        Ok(tags)
    }
}
