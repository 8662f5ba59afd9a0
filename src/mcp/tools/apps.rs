//! App Subscription Tools
//!
//! Tools for inspecting the calling user's developer-portal apps. The
//! caller proves its identity by passing an id token as a tool argument;
//! every failure mode is reported as a text payload so the protocol
//! reply stays well-formed.

use serde::Deserialize;
use serde_json::Value;

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{RegisteredTool, ToolBuilder, ToolRegistry, ToolResult};

use tracing::debug;

/// Register app tools with the registry
pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register(apps_list_tool());
}

// ============================================================================
// appsList
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppsListParams {
    id_token: String,
}

fn apps_list_tool() -> RegisteredTool {
    ToolBuilder::new("appsList")
        .title("App Subscriptions List Tool")
        .description("Lists all subscriptions to API products.")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "idToken": {
                    "type": "string",
                    "description": "Identity token of the calling user"
                }
            },
            "required": ["idToken"]
        }))
        .build(apps_list_handler)
}

async fn apps_list_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: AppsListParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let user = match ctx.verifier.verify(&params.id_token).await {
        Ok(user) => user,
        Err(e) => {
            debug!("appsList token verification failed: {}", e);
            return Ok(ToolsCallResult::text("Could not verify the user."));
        }
    };

    let email = match user.email {
        Some(email) => email,
        None => return Ok(ToolsCallResult::text("Could not find the user.")),
    };

    match ctx.portal.get_apps(&email).await {
        Ok(apps) if !apps.is_null() => {
            let text =
                serde_json::to_string(&apps).map_err(|e| McpError::InternalError(e.to_string()))?;
            Ok(ToolsCallResult::text(text))
        }
        Ok(_) => Ok(ToolsCallResult::text("No apps found.")),
        Err(e) => {
            debug!("appsList portal lookup failed for {}: {}", email, e);
            Ok(ToolsCallResult::text("No apps found."))
        }
    }
}
