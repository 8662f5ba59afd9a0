//! Developer portal HTTP routes.
//!
//! These endpoints back the self-service portal frontend: developer
//! sign-up, app management, and product subscriptions. Every call is
//! forwarded to the API hub's portal surface, and upstream failures keep
//! their original status code so the frontend can react to conflicts and
//! missing resources directly.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::hub::UpstreamError;
use crate::server::authorize::AuthUser;
use crate::server::state::ServerState;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAppBody {
    pub name: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Upstream failures keep their status code, with the upstream message as a
/// plain text body.
fn upstream_error_response(err: UpstreamError) -> Response {
    let status = StatusCode::from_u16(err.code).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, err.message).into_response()
}

async fn create_user(State(state): State<ServerState>, Json(body): Json<Value>) -> Response {
    match state.portal.create_developer(&body).await {
        Ok(_) => Json(body).into_response(),
        Err(err) => {
            warn!("Developer creation failed: {}", err);
            let status = StatusCode::from_u16(err.code).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, "There was an error creating the user.").into_response()
        }
    }
}

async fn get_user_apps(
    _user: AuthUser,
    State(state): State<ServerState>,
    Path(email): Path<String>,
) -> Response {
    match state.portal.get_apps(&email).await {
        Ok(apps) => Json(apps).into_response(),
        Err(err) => upstream_error_response(err),
    }
}

async fn create_user_app(
    _user: AuthUser,
    State(state): State<ServerState>,
    Path(email): Path<String>,
    Json(body): Json<CreateAppBody>,
) -> Response {
    match state.portal.create_app(&email, &body.name).await {
        Ok(app) => Json(app).into_response(),
        Err(err) => upstream_error_response(err),
    }
}

async fn delete_user_app(
    _user: AuthUser,
    State(state): State<ServerState>,
    Path((email, app_name)): Path<(String, String)>,
) -> Response {
    match state.portal.delete_app(&email, &app_name).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => upstream_error_response(err),
    }
}

async fn get_products(State(state): State<ServerState>) -> Response {
    match state.portal.get_products().await {
        Ok(products) => {
            let listing = products.get("apiProduct").cloned().unwrap_or(Value::Null);
            Json(listing).into_response()
        }
        Err(err) => upstream_error_response(err),
    }
}

async fn add_key_product(
    _user: AuthUser,
    State(state): State<ServerState>,
    Path((email, app_name, key_name, product_name)): Path<(String, String, String, String)>,
) -> Response {
    match state
        .portal
        .add_app_key_products(&email, &app_name, &key_name, &[product_name])
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(err) => upstream_error_response(err),
    }
}

async fn remove_key_product(
    _user: AuthUser,
    State(state): State<ServerState>,
    Path((email, app_name, key_name, product_name)): Path<(String, String, String, String)>,
) -> Response {
    match state
        .portal
        .remove_app_key_product(&email, &app_name, &key_name, &product_name)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(err) => upstream_error_response(err),
    }
}

/// Portal routes:
/// - POST /users (open, developer sign-up)
/// - GET /users/{email}/apps
/// - POST /users/{email}/apps
/// - DELETE /users/{email}/apps/{app_name}
/// - GET /products (open, product listing)
/// - PUT /users/{email}/apps/{app_name}/keys/{key_name}/products/{product_name}
/// - DELETE /users/{email}/apps/{app_name}/keys/{key_name}/products/{product_name}
pub fn portal_routes() -> Router<ServerState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{email}/apps", get(get_user_apps))
        .route("/users/{email}/apps", post(create_user_app))
        .route("/users/{email}/apps/{app_name}", delete(delete_user_app))
        .route("/products", get(get_products))
        .route(
            "/users/{email}/apps/{app_name}/keys/{key_name}/products/{product_name}",
            put(add_key_product),
        )
        .route(
            "/users/{email}/apps/{app_name}/keys/{key_name}/products/{product_name}",
            delete(remove_key_product),
        )
}
