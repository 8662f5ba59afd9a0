//! Catalog Tools
//!
//! Tools for reading the published API catalog.

use serde::Deserialize;
use serde_json::Value;

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{RegisteredTool, ToolBuilder, ToolRegistry, ToolResult};

/// Register catalog tools with the registry
pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register(apis_list_tool());
    registry.register(api_spec_tool());
}

// ============================================================================
// apisList
// ============================================================================

fn apis_list_tool() -> RegisteredTool {
    ToolBuilder::new("apisList")
        .title("API Catalog List Tool")
        .description("Lists the published APIs and their versions.")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {}
        }))
        .build(apis_list_handler)
}

async fn apis_list_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    let snapshot = ctx.cache.wait_snapshot().await;

    let result = serde_json::json!({
        "apis": snapshot.apis,
        "versions": snapshot.versions.values().collect::<Vec<_>>(),
    });

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// apiSpec
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiSpecParams {
    version: String,
}

fn api_spec_tool() -> RegisteredTool {
    ToolBuilder::new("apiSpec")
        .title("API Spec Tool")
        .description("Fetches the spec contents for an API version.")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "version": {
                    "type": "string",
                    "description": "Full resource name of the API version"
                }
            },
            "required": ["version"]
        }))
        .build(api_spec_handler)
}

async fn api_spec_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ApiSpecParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let specs = match ctx.hub.list_version_specs(&params.version).await {
        Ok(specs) => specs,
        Err(e) => return Ok(ToolsCallResult::error(format!("Could not list specs: {}", e))),
    };

    let spec_ref = match specs.first() {
        Some(spec_ref) => spec_ref,
        None => {
            return Ok(ToolsCallResult::error(format!(
                "No spec found for version {}",
                params.version
            )))
        }
    };

    match ctx.hub.get_spec_contents(&spec_ref.name).await {
        Ok(Some(contents)) => {
            ToolsCallResult::json(&contents).map_err(|e| McpError::InternalError(e.to_string()))
        }
        Ok(None) => Ok(ToolsCallResult::error(format!(
            "Spec contents not found for {}",
            spec_ref.name
        ))),
        Err(e) => Ok(ToolsCallResult::error(format!(
            "Could not fetch spec contents: {}",
            e
        ))),
    }
}
