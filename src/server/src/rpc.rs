//! JSON-RPC 2.0 dispatch.
//!
//! Transport-agnostic: the stdio and HTTP transports hand raw request bytes
//! to [`McpServer::handle_bytes`] and write back whatever it returns.
//! Notifications (requests without an `id`) never get a response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use oci_mcp_registry::RegistryClient;

use crate::prompts;
use crate::tools::builtin::register_builtin_tools;
use crate::tools::{ToolError, ToolRegistry};

/// Protocol revision offered when the client does not ask for one.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

type MethodResult = std::result::Result<Value, JsonRpcError>;

fn invalid_params(message: impl Into<String>) -> JsonRpcError {
    JsonRpcError {
        code: INVALID_PARAMS,
        message: message.into(),
    }
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct PromptParams {
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

fn parse_params<T: DeserializeOwned>(params: &Value) -> std::result::Result<T, JsonRpcError> {
    serde_json::from_value(params.clone()).map_err(|e| invalid_params(e.to_string()))
}

/// Request dispatcher holding the tool registry.
pub struct McpServer {
    tools: ToolRegistry,
}

impl McpServer {
    /// Server with the built-in registry tools.
    pub fn new(client: RegistryClient) -> Self {
        let mut tools = ToolRegistry::new();
        register_builtin_tools(&mut tools, client);
        Self::with_tools(tools)
    }

    pub fn with_tools(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    /// Handle one serialized request. `None` means nothing is sent back.
    pub async fn handle_bytes(&self, bytes: &[u8]) -> Option<String> {
        let response = match serde_json::from_slice::<Value>(bytes) {
            Err(e) => Some(JsonRpcResponse::error(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            )),
            Ok(value) => self.handle_value(value).await,
        };

        response.and_then(|response| match serde_json::to_string(&response) {
            Ok(line) => Some(line),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                None
            }
        })
    }

    async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let id = value.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                format!("Invalid request: {}", e),
            )),
        }
    }

    /// Dispatch a parsed request.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
            tracing::debug!(version = ?request.jsonrpc, "Unexpected jsonrpc version");
        }

        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        };

        tracing::debug!(method = %request.method, "Handling request");
        let result = match request.method.as_str() {
            "initialize" => Ok(self.initialize(&request.params)),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(serde_json::json!({ "tools": self.tools.definitions() })),
            "tools/call" => self.call_tool(&request.params).await,
            "prompts/list" => Ok(serde_json::json!({ "prompts": prompts::definitions() })),
            "prompts/get" => self.get_prompt(&request.params),
            other => Err(JsonRpcError {
                code: METHOD_NOT_FOUND,
                message: format!("Method not found: {}", other),
            }),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id,
                result: None,
                error: Some(error),
            },
        })
    }

    fn initialize(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);

        serde_json::json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false },
                "prompts": { "listChanged": false }
            },
            "serverInfo": {
                "name": crate::SERVER_NAME,
                "version": oci_mcp_core::VERSION
            }
        })
    }

    async fn call_tool(&self, params: &Value) -> MethodResult {
        let CallParams { name, arguments } = parse_params(params)?;

        match self.tools.execute(&name, &arguments).await {
            Ok(output) => Ok(serde_json::json!({
                "content": [{ "type": "text", "text": output.text }],
                "structuredContent": output.structured,
                "isError": false
            })),
            Err(e @ (ToolError::UnknownTool(_) | ToolError::InvalidArguments(_))) => {
                Err(invalid_params(e.to_string()))
            }
            Err(ToolError::Registry(e)) => Ok(serde_json::json!({
                "content": [{ "type": "text", "text": e.to_string() }],
                "structuredContent": {
                    "error": { "kind": e.kind(), "message": e.to_string() }
                },
                "isError": true
            })),
        }
    }

    fn get_prompt(&self, params: &Value) -> MethodResult {
        let PromptParams { name, arguments } = parse_params(params)?;
        let messages =
            prompts::render(&name, &arguments).map_err(|e| invalid_params(e.to_string()))?;

        Ok(serde_json::json!({
            "description": prompts::description(&name),
            "messages": messages
        }))
    }
}
