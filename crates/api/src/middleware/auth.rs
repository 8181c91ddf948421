//! Bearer-token authentication middleware.
//!
//! Every analytics route requires a valid HS256 bearer token issued by the
//! CRM auth service. The validated user id is stored in request extensions
//! for log attribution and rate limiting; reports themselves are
//! organization-wide and never caller-scoped.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use shared::jwt::{extract_user_id, JwtConfig};

/// Authenticated user information extracted from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAuth {
    pub user_id: Uuid,
}

impl UserAuth {
    /// Validates a bearer token and returns the authenticated user.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id =
            extract_user_id(&claims).map_err(|_| "Invalid user ID in token".to_string())?;

        Ok(UserAuth { user_id })
    }
}

/// Middleware that requires bearer-token authentication.
///
/// Validates the `Authorization: Bearer` header and rejects requests without
/// a valid token before any handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    let jwt_config = JwtConfig::with_leeway(
        &state.config.jwt.secret,
        state.config.jwt.token_expiry_secs,
        state.config.jwt.leeway_secs,
    );

    match UserAuth::validate(&jwt_config, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "error": { "message": message }
        })),
    )
        .into_response()
}
