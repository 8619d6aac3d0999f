//! Core types for the tool system

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use oci_mcp_core::OciError;

/// Why a tool call did not produce output.
#[derive(Error, Debug)]
pub enum ToolError {
    /// No tool with that name is registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not match the tool's input schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The registry operation itself failed
    #[error(transparent)]
    Registry(#[from] OciError),
}

/// Successful tool output.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Human-readable rendering, sent as the text content block
    pub text: String,
    /// Machine-readable result; always a JSON object
    pub structured: Value,
}

impl ToolOutput {
    /// Plain string result, wrapped as `{"result": ...}`.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            structured: serde_json::json!({ "result": text }),
            text,
        }
    }

    /// Serializable result. Objects are used as-is, anything else is
    /// wrapped as `{"result": ...}`.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        let value = serde_json::to_value(value).map_err(OciError::from)?;
        let text = serde_json::to_string(&value).map_err(OciError::from)?;
        let structured = match value {
            Value::Object(_) => value,
            other => serde_json::json!({ "result": other }),
        };
        Ok(Self { text, structured })
    }
}

/// What `tools/list` reports for a tool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A callable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (unique within a registry)
    fn name(&self) -> &str;

    /// Description shown to the calling model
    fn description(&self) -> &str;

    /// JSON Schema for the arguments object
    fn parameters(&self) -> Value;

    /// Run the tool.
    async fn execute(&self, args: &Value) -> Result<ToolOutput, ToolError>;
}

/// Deserialize a tool's arguments. A missing arguments object counts as `{}`.
pub fn parse_args<T: DeserializeOwned>(args: &Value) -> Result<T, ToolError> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}
