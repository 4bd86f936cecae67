//! Post routes
//!
//! Reading is public. Creating, editing and deleting require a bearer token,
//! and the acting user always comes from the token.

use crate::auth::{require_auth, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::routes::comments;
use crate::services::PostService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use blog_shared::types::{CreatePostRequest, DeletePostResponse, PostResponse, UpdatePostRequest};

/// Create post routes, including nested comments
pub fn post_routes(state: &AppState) -> Router<AppState> {
    let auth = middleware::from_fn_with_state(state.clone(), require_auth);

    Router::new()
        .route(
            "/",
            get(list_posts).merge(post(create_post).route_layer(auth.clone())),
        )
        .route(
            "/:id",
            get(get_post).merge(
                put(update_post)
                    .delete(delete_post)
                    .route_layer(auth.clone()),
            ),
        )
        .route(
            "/:id/comments",
            get(comments::list_comments)
                .merge(post(comments::create_comment).route_layer(auth)),
        )
}

/// Parse a post id path segment
///
/// Anything other than a positive integer is a bad request.
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest("invalid post id".to_string())),
    }
}

/// List all posts, newest first
///
/// GET /api/v1/posts
async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<PostResponse>>> {
    let posts = PostService::list(state.db()).await?;
    Ok(Json(posts))
}

/// Get a single post
///
/// GET /api/v1/posts/:id
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostResponse>> {
    let post = PostService::get(state.db(), parse_id(&id)?).await?;
    Ok(Json(post))
}

/// Create a post
///
/// POST /api/v1/posts
async fn create_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
    let post = PostService::create(state.db(), auth_user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Update a post (author only)
///
/// PUT /api/v1/posts/:id
async fn update_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> ApiResult<Json<PostResponse>> {
    let post = PostService::update(state.db(), auth_user.user_id, parse_id(&id)?, req).await?;
    Ok(Json(post))
}

/// Delete a post (author only)
///
/// DELETE /api/v1/posts/:id
async fn delete_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletePostResponse>> {
    let deleted = PostService::delete(state.db(), auth_user.user_id, parse_id(&id)?).await?;
    Ok(Json(deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(1))]
    #[case("42", Some(42))]
    #[case("0", None)]
    #[case("-3", None)]
    #[case("abc", None)]
    #[case("1.5", None)]
    fn test_parse_id(#[case] raw: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_id(raw).ok(), expected);
    }
}
