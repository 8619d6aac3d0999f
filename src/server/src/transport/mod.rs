//! Transports carrying JSON-RPC requests to the [`McpServer`](crate::McpServer).

pub mod http;
pub mod stdio;
