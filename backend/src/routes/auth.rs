//! Authentication routes
//!
//! Provides endpoints for user registration, login, and the current identity.
//!
//! # Performance Optimizations
//!
//! - Uses pre-computed JWT keys from AppState (no per-request allocation)
//! - Password hashing runs on blocking thread pool (doesn't block async runtime)

use crate::auth::{require_auth, AuthUser};
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use blog_shared::types::{
    IdentityResponse, LoginRequest, RegisterRequest, RegisterResponse, TokenResponse,
};

/// Create auth routes
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/me",
            get(me).route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        )
}

/// Register a new user
///
/// POST /api/v1/auth/register
///
/// # Performance
/// Password hashing is offloaded to blocking thread pool.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let user = UserService::register(state.db(), state.passwords(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with username and password
///
/// POST /api/v1/auth/login
///
/// # Performance
/// Password verification is offloaded to blocking thread pool.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = UserService::login(state.db(), state.passwords(), state.jwt(), req).await?;
    Ok(Json(token))
}

/// Identity bound to the request by the auth middleware
///
/// GET /api/v1/auth/me
///
/// # Authentication
/// Requires valid Bearer token in Authorization header.
async fn me(auth_user: AuthUser) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        id: auth_user.user_id,
        username: auth_user.username,
    })
}
