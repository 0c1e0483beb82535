//! Authentication API Endpoints
//! Mission: Registration, login, identity, and admin user management

use crate::{
    auth::{
        middleware::{auth_middleware, require_role, RequiredRoles},
        models::{
            AuthContext, AuthResponse, LoginRequest, MeResponse, RegisterRequest, Role, User,
        },
    },
    error::ApiError,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Public credential endpoints plus the authenticated /me route.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/api/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state);

    public.merge(protected)
}

/// Admin-only user management.
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/:id", delete(delete_user))
        .route("/api/users/:id/role", patch(update_user_role))
        .route_layer(middleware::from_fn_with_state(
            RequiredRoles(&[Role::Admin]),
            require_role,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

/// Register - POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if payload.full_name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
        || payload.role.is_empty()
    {
        return Err(ApiError::Validation("All fields are required"));
    }

    let role = Role::from_str(&payload.role).ok_or(ApiError::Validation("Invalid role selected"))?;

    // bcrypt is deliberately slow; keep it off the async workers.
    let users = state.users.clone();
    let user = tokio::task::spawn_blocking(move || {
        users.register(&payload.full_name, &payload.email, &payload.password, role)
    })
    .await
    .map_err(|e| {
        error!("Registration task panicked: {}", e);
        ApiError::Internal
    })??;

    let token = state.jwt.issue(user.id, user.role)?;

    info!("Registered {} as {}", user.email, user.role.as_str());
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            role: user.role,
            full_name: None,
        }),
    ))
}

/// Login - POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let users = state.users.clone();
    let user = tokio::task::spawn_blocking(move || {
        users.verify_credentials(&payload.email, &payload.password)
    })
    .await
    .map_err(|e| {
        error!("Login task panicked: {}", e);
        ApiError::Internal
    })?
    .map_err(|e| {
        if matches!(e, crate::auth::user_store::StoreError::InvalidCredentials) {
            warn!("Failed login attempt");
        }
        ApiError::from(e)
    })?;

    let token = state.jwt.issue(user.id, user.role)?;

    info!("Login successful for {}", user.email);
    Ok(Json(AuthResponse {
        token,
        role: user.role,
        full_name: Some(user.full_name),
    }))
}

/// Current identity - GET /api/auth/me
///
/// Derived entirely from the verified token; no database lookup.
async fn me(Extension(ctx): Extension<AuthContext>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: ctx.user_id,
        role: ctx.role,
    })
}

/// List users - GET /api/users
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.list_users()?;
    Ok(Json(users))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CreateUserRequest {
    full_name: String,
    email: String,
    password: String,
    role: Option<String>,
}

/// Create user - POST /api/users
async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    if payload.full_name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::Validation("Missing required fields"));
    }

    let role = match payload.role.as_deref() {
        Some(r) => Role::from_str(r).ok_or(ApiError::Validation("Invalid role"))?,
        None => Role::default(),
    };

    let users = state.users.clone();
    let user = tokio::task::spawn_blocking(move || {
        users.register(&payload.full_name, &payload.email, &payload.password, role)
    })
    .await
    .map_err(|e| {
        error!("User creation task panicked: {}", e);
        ApiError::Internal
    })??;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete user - DELETE /api/users/:id
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.users.delete_user(&id)? {
        return Err(ApiError::NotFound("User not found"));
    }
    Ok(Json(json!({ "message": "User deleted" })))
}

#[derive(Debug, Deserialize)]
struct UpdateRoleRequest {
    role: String,
}

/// Change role - PATCH /api/users/:id/role
///
/// Role mutation is an admin-only operation; nothing else in the system
/// changes a stored role.
async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<Value>, ApiError> {
    let role = Role::from_str(&payload.role).ok_or(ApiError::Validation("Invalid role"))?;

    let user = state
        .users
        .update_role(&id, role)?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(json!({ "message": "Role updated", "user": user })))
}
