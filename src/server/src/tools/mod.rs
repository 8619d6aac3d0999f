//! Tool system: the [`Tool`] trait, the registry that dispatches calls, and
//! the built-in registry tools.

pub mod builtin;
mod registry;
mod types;

pub use registry::ToolRegistry;
pub use types::{parse_args, Tool, ToolDefinition, ToolError, ToolOutput};
