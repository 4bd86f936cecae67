//! Comment routes, nested under a post

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::routes::posts::parse_id;
use crate::services::CommentService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use blog_shared::types::{CommentResponse, CreateCommentRequest};

/// List comments on a post, oldest first
///
/// GET /api/v1/posts/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let comments = CommentService::list(state.db(), parse_id(&id)?).await?;
    Ok(Json(comments))
}

/// Comment on a post
///
/// POST /api/v1/posts/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let comment =
        CommentService::create(state.db(), auth_user.user_id, parse_id(&id)?, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
