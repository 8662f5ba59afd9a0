use axum::extract::FromRef;

use crate::auth::TokenVerifier;
use crate::cache::CatalogCache;
use crate::hub::ApiHub;
use crate::mcp::McpState;
use crate::portal::PortalApi;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedApiHub = Arc<dyn ApiHub>;
pub type GuardedPortalApi = Arc<dyn PortalApi>;
pub type GuardedCatalogCache = Arc<CatalogCache>;
pub type GuardedTokenVerifier = Arc<dyn TokenVerifier>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hub: GuardedApiHub,
    pub portal: GuardedPortalApi,
    pub cache: GuardedCatalogCache,
    pub verifier: GuardedTokenVerifier,
    pub mcp: McpState,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedApiHub {
    fn from_ref(input: &ServerState) -> Self {
        input.hub.clone()
    }
}

impl FromRef<ServerState> for GuardedPortalApi {
    fn from_ref(input: &ServerState) -> Self {
        input.portal.clone()
    }
}

impl FromRef<ServerState> for GuardedCatalogCache {
    fn from_ref(input: &ServerState) -> Self {
        input.cache.clone()
    }
}

impl FromRef<ServerState> for GuardedTokenVerifier {
    fn from_ref(input: &ServerState) -> Self {
        input.verifier.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for McpState {
    fn from_ref(input: &ServerState) -> Self {
        input.mcp.clone()
    }
}
