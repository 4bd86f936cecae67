//! Comment service

use crate::error::ApiError;
use crate::repositories::{CommentRepository, PostRepository};
use blog_shared::types::{CommentResponse, CreateCommentRequest};
use blog_shared::validation::validate_content;
use blog_shared::ValidationError;
use sqlx::PgPool;
use tracing::info;

/// Comment service for blog operations
pub struct CommentService;

impl CommentService {
    /// List comments on a post, oldest first
    pub async fn list(pool: &PgPool, post_id: i64) -> Result<Vec<CommentResponse>, ApiError> {
        Self::ensure_post_exists(pool, post_id).await?;

        let comments = CommentRepository::list_for_post(pool, post_id).await?;
        Ok(comments.into_iter().map(CommentResponse::from).collect())
    }

    /// Add a comment by `user_id` to a post
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<CommentResponse, ApiError> {
        ValidationError::check("content", validate_content(&req.content))?;
        Self::ensure_post_exists(pool, post_id).await?;

        let comment = CommentRepository::create(pool, post_id, user_id, &req.content).await?;
        info!(comment_id = comment.id, post_id, user_id, "Comment created");

        Ok(comment.into())
    }

    async fn ensure_post_exists(pool: &PgPool, post_id: i64) -> Result<(), ApiError> {
        PostRepository::find_by_id(pool, post_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound("post not found".to_string()))
    }
}

