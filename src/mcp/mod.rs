//! MCP (Model Context Protocol) Server
//!
//! Exposes the API catalog to tool-calling agents over the MCP
//! streamable HTTP transport.
//!
//! ## Architecture
//!
//! - Transport: streamable HTTP at `/mcp` (POST messages, GET event
//!   stream, DELETE terminate), session id in the `mcp-session-id` header
//! - Sessions: opaque random ids mapped to exclusively-owned transports
//! - Tools: app subscription lookup plus catalog reads; identity is
//!   proven per-call with an id token argument

pub mod context;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod tools;

pub use handler::{
    create_mcp_state, handle_mcp_delete, handle_mcp_get, handle_mcp_post, McpState,
    MCP_SESSION_HEADER,
};
pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::ToolRegistry;
pub use session::SessionRegistry;
