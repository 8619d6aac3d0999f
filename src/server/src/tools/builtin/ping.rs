//! Ping tool - health check

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::types::{Tool, ToolError, ToolOutput};

pub struct PingTool;

#[async_trait]
impl Tool for PingTool {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Simple health-check tool that returns 'pong'."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: &Value) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text("pong"))
    }
}
