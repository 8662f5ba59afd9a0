//! MCP Tool Execution Context
//!
//! Provides access to server state for tool implementations.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::cache::CatalogCache;
use crate::hub::ApiHub;
use crate::portal::PortalApi;

/// Context provided to tool handlers during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Session this call arrived on
    pub session_id: String,

    /// Upstream API hub client
    pub hub: Arc<dyn ApiHub>,

    /// Developer portal client
    pub portal: Arc<dyn PortalApi>,

    /// Cached catalog snapshot
    pub cache: Arc<CatalogCache>,

    /// Identity token verifier
    pub verifier: Arc<dyn TokenVerifier>,

    /// Server version info
    pub server_version: String,
}
