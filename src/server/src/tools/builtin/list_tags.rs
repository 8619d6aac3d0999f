//! list_oci_tags tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use oci_mcp_registry::{Credentials, RegistryClient};

use super::string_property;
use crate::tools::types::{parse_args, Tool, ToolError, ToolOutput};

#[derive(Debug, Deserialize)]
struct ListTagsArgs {
    registry: String,
    repository: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

pub struct ListTagsTool {
    client: RegistryClient,
}

impl ListTagsTool {
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListTagsTool {
    fn name(&self) -> &str {
        "list_oci_tags"
    }

    fn description(&self) -> &str {
        "List tags for an OCI repository. Works with any container registry, including Docker Hub."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "registry": string_property("Registry host, e.g. \"ghcr.io\", \"registry-1.docker.io\", \"localhost:5000\""),
                "repository": string_property("Repository path, e.g. \"owner/name\" or \"library/alpine\""),
                "username": string_property("Optional username for basic auth"),
                "password": string_property("Optional password or token for basic auth")
            },
            "required": ["registry", "repository"]
        })
    }

    async fn execute(&self, args: &Value) -> Result<ToolOutput, ToolError> {
        let args: ListTagsArgs = parse_args(args)?;
        let credentials = Credentials::from_parts(args.username, args.password);

        let tags = self
            .client
            .list_tags(&args.registry, &args.repository, credentials.as_ref())
            .await?;
        ToolOutput::json(&tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oci_mcp_core::OciError;
    use oci_mcp_registry::ClientOptions;

    fn tool() -> ListTagsTool {
        ListTagsTool::new(RegistryClient::new(&ClientOptions::default()).unwrap())
    }

    #[tokio::test]
    async fn test_list_tags_requires_repository() {
        let err = tool()
            .execute(&serde_json::json!({"registry": "ghcr.io"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_list_tags_rejects_invalid_repository() {
        let err = tool()
            .execute(&serde_json::json!({"registry": "ghcr.io", "repository": "Bad/Name"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::Registry(OciError::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_list_tags_schema() {
        let schema = tool().parameters();
        assert_eq!(
            schema["required"],
            serde_json::json!(["registry", "repository"])
        );
    }
}
