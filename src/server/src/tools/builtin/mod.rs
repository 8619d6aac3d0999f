//! Built-in tools
//!
//! - ping: health check
//! - list_oci_tags: tags of a repository
//! - get_oci_details: digest, annotations and architectures of a tag or digest

mod details;
mod list_tags;
mod ping;

use std::sync::Arc;

use oci_mcp_registry::RegistryClient;

use super::registry::ToolRegistry;

pub use details::GetDetailsTool;
pub use list_tags::ListTagsTool;
pub use ping::PingTool;

/// Register all built-in tools with the registry.
pub fn register_builtin_tools(registry: &mut ToolRegistry, client: RegistryClient) {
    registry.register(Arc::new(PingTool));
    registry.register(Arc::new(ListTagsTool::new(client.clone())));
    registry.register(Arc::new(GetDetailsTool::new(client)));

    tracing::debug!(count = registry.len(), "Registered built-in tools");
}

/// Schema property shared by the registry tools.
fn string_property(description: &str) -> serde_json::Value {
    serde_json::json!({ "type": "string", "description": description })
}
