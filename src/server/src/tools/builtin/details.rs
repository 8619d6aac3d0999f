//! get_oci_details tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use oci_mcp_registry::{Credentials, RegistryClient};

use super::string_property;
use crate::tools::types::{parse_args, Tool, ToolError, ToolOutput};

#[derive(Debug, Deserialize)]
struct DetailsArgs {
    registry: String,
    repository: String,
    reference: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

pub struct GetDetailsTool {
    client: RegistryClient,
}

impl GetDetailsTool {
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetDetailsTool {
    fn name(&self) -> &str {
        "get_oci_details"
    }

    fn description(&self) -> &str {
        "Fetch manifest details for a tag or digest. Returns the digest, annotations and supported architectures."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "registry": string_property("Registry host, e.g. \"ghcr.io\", \"registry-1.docker.io\", \"localhost:5000\""),
                "repository": string_property("Repository path, e.g. \"owner/name\" or \"library/alpine\""),
                "reference": string_property("Tag (e.g. \"latest\") or digest (e.g. \"sha256:...\")"),
                "username": string_property("Optional username for basic auth"),
                "password": string_property("Optional password or token for basic auth")
            },
            "required": ["registry", "repository", "reference"]
        })
    }

    async fn execute(&self, args: &Value) -> Result<ToolOutput, ToolError> {
        let args: DetailsArgs = parse_args(args)?;
        let credentials = Credentials::from_parts(args.username, args.password);

        let details = self
            .client
            .get_details(
                &args.registry,
                &args.repository,
                &args.reference,
                credentials.as_ref(),
            )
            .await?;
        ToolOutput::json(&details)
    }
}
