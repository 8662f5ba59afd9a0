//! MCP Streamable HTTP Handler
//!
//! Implements the streamable HTTP transport for MCP. POST carries
//! JSON-RPC messages (including the initialize handshake), GET opens the
//! server-to-client event stream, DELETE terminates the session. The
//! session id travels in the `mcp-session-id` header.
//!
//! Every POST lands in exactly one of four dispatcher states:
//! - no session id, initialize message: mint a session and handle it
//! - session id registered: forward to that session's transport
//! - session id unknown: reject with a structured protocol error
//! - no session id, anything else: reject with a structured protocol error

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::HeaderName, HeaderMap, HeaderValue, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, info};

use super::context::ToolContext;
use super::protocol::{
    is_initialize_request, methods, InitializeParams, InitializeResult, McpError, McpRequest,
    McpResponse, PingResult, ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability,
    ToolsListResult, MCP_PROTOCOL_VERSION,
};
use super::registry::ToolRegistry;
use super::session::{SessionRegistry, SessionTransport};
use crate::server::state::ServerState;

/// Header carrying the MCP session id.
pub const MCP_SESSION_HEADER: &str = "mcp-session-id";

/// Server name advertised in the initialize handshake.
pub const MCP_SERVER_NAME: &str = "apigee-user";

/// State shared across MCP requests.
#[derive(Clone)]
pub struct McpState {
    pub registry: Arc<ToolRegistry>,
    pub sessions: Arc<SessionRegistry>,
}

/// Create the MCP state with all tools registered.
pub fn create_mcp_state() -> McpState {
    let mut registry = ToolRegistry::new();

    super::tools::register_all_tools(&mut registry);

    info!(
        "MCP registry initialized with {} tools",
        registry.tool_count()
    );

    McpState {
        registry: Arc::new(registry),
        sessions: Arc::new(SessionRegistry::new()),
    }
}

// ============================================================================
// HTTP endpoints
// ============================================================================

/// POST /mcp: the message channel.
pub async fn handle_mcp_post(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    match extract_session_id(&headers) {
        Some(id) => match state.mcp.sessions.lookup(&id).await {
            // Registered session: forward the message to its transport.
            Some(transport) => {
                transport.touch();
                dispatch_message(&body, &transport, &state).await
            }
            // Unknown id is terminal for this request.
            None => {
                debug!("MCP POST with unknown session id: {}", id);
                session_rejection()
            }
        },
        // No session yet: only an initialize message may open one.
        None if is_initialize_request(&body) => {
            let transport = state.mcp.sessions.create().await;
            let response = dispatch_message(&body, &transport, &state).await;
            with_session_header(response, &transport.id)
        }
        None => {
            debug!("MCP POST without session id and no initialize payload");
            session_rejection()
        }
    }
}

/// GET /mcp: open the server-to-client event stream for a session.
pub async fn handle_mcp_get(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    let transport = match lookup_session(&state, &headers).await {
        Some(transport) => transport,
        None => return invalid_session_response(),
    };
    transport.touch();

    let receiver = transport.open_stream();
    let stream = futures::stream::unfold(receiver, |mut rx| async move {
        match rx.recv().await {
            Some(message) => match Event::default().event("message").json_data(&message) {
                Ok(event) => Some((Ok::<_, Infallible>(event), rx)),
                Err(e) => {
                    error!("Failed to encode SSE event: {}", e);
                    None
                }
            },
            None => None,
        }
    });

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// DELETE /mcp: explicit session termination.
pub async fn handle_mcp_delete(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    let transport = match lookup_session(&state, &headers).await {
        Some(transport) => transport,
        None => return invalid_session_response(),
    };
    state.mcp.sessions.remove(&transport.id).await;
    StatusCode::OK.into_response()
}

fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(MCP_SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

async fn lookup_session(
    state: &ServerState,
    headers: &HeaderMap,
) -> Option<Arc<SessionTransport>> {
    let id = extract_session_id(headers)?;
    state.mcp.sessions.lookup(&id).await
}

/// Structured protocol error for POSTs that cannot be tied to a session.
fn session_rejection() -> Response {
    let body = McpResponse::error(None, McpError::SessionNotEstablished);
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Plain 400 for stream/terminate requests without a usable session id.
fn invalid_session_response() -> Response {
    (StatusCode::BAD_REQUEST, "Invalid or missing session ID").into_response()
}

fn with_session_header(mut response: Response, session_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(session_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(MCP_SESSION_HEADER), value);
    }
    response
}

// ============================================================================
// Message dispatch
// ============================================================================

/// Handle one JSON-RPC message on an established transport and map the
/// outcome to an HTTP response: 202 for notifications, 200 for replies
/// (including protocol-level errors), 400 for unparseable bodies.
async fn dispatch_message(body: &str, transport: &SessionTransport, state: &ServerState) -> Response {
    let request: McpRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            let body = McpResponse::error(None, McpError::ParseError(e.to_string()));
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    if request.is_notification() {
        handle_notification(&request);
        return StatusCode::ACCEPTED.into_response();
    }

    let response = handle_request(request, transport, state).await;
    (StatusCode::OK, Json(response)).into_response()
}

fn handle_notification(request: &McpRequest) {
    match request.method.as_str() {
        methods::INITIALIZED => {
            debug!("MCP client reported initialized");
        }
        other => {
            debug!("Ignoring MCP notification: {}", other);
        }
    }
}

async fn handle_request(
    request: McpRequest,
    transport: &SessionTransport,
    state: &ServerState,
) -> McpResponse {
    let request_id = match request.id.clone() {
        Some(id) => id,
        None => {
            return McpResponse::error(
                None,
                McpError::InvalidRequest("Missing request id".to_string()),
            );
        }
    };

    let result = match request.method.as_str() {
        methods::INITIALIZE => handle_initialize(&request, transport).await,
        methods::PING => handle_ping(&request).await,
        methods::TOOLS_LIST => {
            if !transport.is_initialized() {
                Err(McpError::InvalidRequest("Not initialized".to_string()))
            } else {
                handle_tools_list(&state.mcp.registry).await
            }
        }
        methods::TOOLS_CALL => {
            if !transport.is_initialized() {
                Err(McpError::InvalidRequest("Not initialized".to_string()))
            } else {
                handle_tools_call(&request, transport, state).await
            }
        }
        other => Err(McpError::MethodNotFound(other.to_string())),
    };

    match result {
        Ok(value) => McpResponse::success(request_id, value),
        Err(error) => McpResponse::error(Some(request_id), error),
    }
}

async fn handle_initialize(
    request: &McpRequest,
    transport: &SessionTransport,
) -> Result<serde_json::Value, McpError> {
    let params: InitializeParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .unwrap_or(InitializeParams {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: Default::default(),
            client_info: None,
        });

    if let Some(client) = &params.client_info {
        debug!("MCP initialize from {} {}", client.name, client.version);
    }

    transport.mark_initialized();

    let result = InitializeResult {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability { list_changed: None }),
        },
        server_info: ServerInfo {
            name: MCP_SERVER_NAME.to_string(),
            version: format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("GIT_HASH")),
        },
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_ping(_request: &McpRequest) -> Result<serde_json::Value, McpError> {
    serde_json::to_value(PingResult {}).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_list(registry: &ToolRegistry) -> Result<serde_json::Value, McpError> {
    let result = ToolsListResult {
        tools: registry.list_tools(),
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_call(
    request: &McpRequest,
    transport: &SessionTransport,
    state: &ServerState,
) -> Result<serde_json::Value, McpError> {
    let params: ToolsCallParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

    let tool = state
        .mcp
        .registry
        .get_tool(&params.name)
        .ok_or_else(|| McpError::MethodNotFound(format!("Unknown tool: {}", params.name)))?;

    let ctx = ToolContext {
        session_id: transport.id.clone(),
        hub: state.hub.clone(),
        portal: state.portal.clone(),
        cache: state.cache.clone(),
        verifier: state.verifier.clone(),
        server_version: format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("GIT_HASH")),
    };

    let arguments = params.arguments.clone().unwrap_or(serde_json::json!({}));
    let result = (tool.handler)(ctx, arguments).await?;

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}
