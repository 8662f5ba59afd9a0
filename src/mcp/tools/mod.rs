//! MCP Tools
//!
//! Tool implementations exposed to MCP clients.

pub mod apps;
pub mod catalog;

use super::registry::ToolRegistry;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut ToolRegistry) {
    apps::register_tools(registry);
    catalog::register_tools(registry);
}
