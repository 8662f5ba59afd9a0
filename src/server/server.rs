use anyhow::Result;
use std::time::{Duration, Instant};

use tracing::info;

use crate::cache::EnrichedVersion;
use crate::hub::{HubApi, HubDeployment, HubSpecContents};
use crate::mcp::{handle_mcp_delete, handle_mcp_get, handle_mcp_post, McpState};
use tower_http::{cors::CorsLayer, services::ServeDir};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::portal_routes::portal_routes;
use super::state::*;
use super::{log_requests, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct ApiSpecQuery {
    version: Option<String>,
}

/// The catalog as served to browsers and agents: the public APIs plus every
/// version with its resolved detail.
#[derive(Serialize)]
struct CatalogListing<'a> {
    apis: &'a [HubApi],
    versions: Vec<&'a EnrichedVersion>,
}

/// The TS frontend expects the enrichment both nested under `version` and
/// hoisted to the top level, so both shapes are kept on the wire.
#[derive(Serialize)]
struct ApiSpecResponse<'a> {
    version: &'a EnrichedVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    api: Option<&'a HubApi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deployment: Option<&'a HubDeployment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spec: Option<&'a HubSpecContents>,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn get_apis(State(cache): State<GuardedCatalogCache>) -> Response {
    let snapshot = cache.wait_snapshot().await;
    Json(CatalogListing {
        apis: &snapshot.apis,
        versions: snapshot.versions.values().collect(),
    })
    .into_response()
}

async fn get_api_spec(
    State(cache): State<GuardedCatalogCache>,
    Query(query): Query<ApiSpecQuery>,
) -> Response {
    let snapshot = cache.current();
    let version_name = query.version.unwrap_or_default();

    match snapshot.versions.get(&version_name) {
        Some(version) => Json(ApiSpecResponse {
            version,
            api: version.api_data.as_ref(),
            deployment: version.deployment.as_ref(),
            spec: version.spec.as_ref(),
        })
        .into_response(),
        None => (StatusCode::NOT_FOUND, "Spec not found").into_response(),
    }
}

async fn post_cache_refresh(State(cache): State<GuardedCatalogCache>) -> impl IntoResponse {
    info!("Cache refresh call received.");
    cache.spawn_refresh();
    (StatusCode::ACCEPTED, "Cache refresh initiated")
}

async fn get_client_config(State(config): State<ServerConfig>) -> impl IntoResponse {
    Json(config.client_config)
}

pub fn make_app(
    config: ServerConfig,
    hub: GuardedApiHub,
    portal: GuardedPortalApi,
    cache: GuardedCatalogCache,
    verifier: GuardedTokenVerifier,
    mcp_state: McpState,
) -> Result<Router> {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        hub,
        portal,
        cache,
        verifier,
        mcp: mcp_state,
        hash: env!("GIT_HASH").to_owned(),
    };

    let catalog_routes: Router = Router::new()
        .route("/apis", get(get_apis))
        .route("/api-spec", get(get_api_spec))
        .route("/cache-refresh", post(post_cache_refresh))
        .route("/config", get(get_client_config))
        .with_state(state.clone());

    let mcp_routes: Router = Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route("/mcp", get(handle_mcp_get))
        .route("/mcp", delete(handle_mcp_delete))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .merge(catalog_routes)
        .merge(mcp_routes)
        .merge(portal_routes().with_state(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    hub: GuardedApiHub,
    portal: GuardedPortalApi,
    cache: GuardedCatalogCache,
    verifier: GuardedTokenVerifier,
    mcp_state: McpState,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, hub, portal, cache, verifier, mcp_state)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
