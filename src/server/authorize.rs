use super::state::ServerState;
use crate::auth::VerifiedUser;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::debug;

pub const HEADER_AUTHORIZATION_KEY: &str = "Authorization";

/// Verified identity of the caller, extracted from the `Authorization`
/// bearer token on guarded portal routes.
#[derive(Debug)]
pub struct AuthUser {
    pub subject: String,
    pub email: Option<String>,
}

pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "You are not authorized to make this request" })),
        )
            .into_response()
    }
}

fn extract_bearer_token(parts: &Parts) -> Option<String> {
    let header = parts
        .headers
        .get(HEADER_AUTHORIZATION_KEY)?
        .to_str()
        .ok()?;
    let mut words = header.split_whitespace();
    match words.next() {
        Some("Bearer") => words.next().map(|s| s.to_string()),
        _ => None,
    }
}

async fn verify_request_token(parts: &Parts, ctx: &ServerState) -> Option<VerifiedUser> {
    let token = match extract_bearer_token(parts) {
        None => {
            debug!("No bearer token in Authorization header.");
            return None;
        }
        Some(x) => x,
    };

    match ctx.verifier.verify(&token).await {
        Ok(user) => {
            debug!("Verified token for subject {}", user.subject);
            Some(user)
        }
        Err(err) => {
            debug!("Token verification failed: {}", err);
            None
        }
    }
}

impl FromRequestParts<ServerState> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        verify_request_token(parts, ctx)
            .await
            .map(|user| AuthUser {
                subject: user.subject,
                email: user.email,
            })
            .ok_or(AuthRejection)
    }
}
