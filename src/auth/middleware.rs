//! Access Control Middleware
//! Mission: Gate protected routes by bearer token and, where declared, by role

use crate::auth::{
    jwt::{JwtHandler, TokenError},
    models::{AuthContext, Role},
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Authentication middleware.
///
/// Extracts the bearer token, verifies it, and attaches an [`AuthContext`]
/// to the request. On any failure the request terminates here; no handler
/// behind this layer ever runs without a verified identity.
pub async fn auth_middleware(
    State(jwt): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let claims = jwt.verify(token).map_err(|e| match e {
        TokenError::Expired => AuthError::ExpiredToken,
        TokenError::Malformed => AuthError::MalformedToken,
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::MalformedToken)?;

    req.extensions_mut().insert(AuthContext {
        user_id,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Allowed-role set for a router, fixed at route registration.
#[derive(Debug, Clone, Copy)]
pub struct RequiredRoles(pub &'static [Role]);

/// Authorization middleware. Layer it inside [`auth_middleware`] so the
/// context is already attached; a request that somehow reaches this layer
/// without one is rejected, not passed through.
pub async fn require_role(
    State(RequiredRoles(allowed)): State<RequiredRoles>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let ctx = req
        .extensions()
        .get::<AuthContext>()
        .ok_or(AuthError::MissingToken)?;

    if !allowed.contains(&ctx.role) {
        return Err(AuthError::InsufficientRole {
            role: ctx.role,
            user_id: ctx.user_id,
        });
    }

    Ok(next.run(req).await)
}

/// Access control failures. The three token kinds collapse to one 401
/// outward but are logged distinctly.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    MalformedToken,
    ExpiredToken,
    InsufficientRole { role: Role, user_id: Uuid },
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => {
                warn!(kind = "missing", "Rejected request without bearer token");
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            AuthError::MalformedToken => {
                warn!(kind = "malformed", "Rejected unverifiable bearer token");
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            AuthError::ExpiredToken => {
                warn!(kind = "expired", "Rejected expired bearer token");
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            AuthError::InsufficientRole { role, user_id } => {
                warn!(
                    role = role.as_str(),
                    user_id = %user_id,
                    "Rejected request from disallowed role"
                );
                (
                    StatusCode::FORBIDDEN,
                    "Access denied: insufficient permissions",
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
