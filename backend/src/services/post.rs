//! Post service
//!
//! Ownership is always taken from the authenticated identity; a post can
//! only be changed or deleted by the user who created it.

use crate::error::ApiError;
use crate::repositories::{PostRecord, PostRepository};
use blog_shared::types::{CreatePostRequest, DeletePostResponse, PostResponse, UpdatePostRequest};
use blog_shared::validation::{validate_content, validate_title};
use blog_shared::ValidationError;
use sqlx::PgPool;
use tracing::info;

/// Post service for blog operations
pub struct PostService;

impl PostService {
    /// Validate title and content of a new or edited post
    pub fn validate_post(title: &str, content: &str) -> Result<(), ValidationError> {
        ValidationError::check("title", validate_title(title))?;
        ValidationError::check("content", validate_content(content))?;
        Ok(())
    }

    /// Refuse changes by anyone other than the post's author
    pub fn ensure_author(post: &PostRecord, user_id: i64) -> Result<(), ApiError> {
        if post.user_id != user_id {
            return Err(ApiError::Forbidden(
                "you are not the author of this post".to_string(),
            ));
        }
        Ok(())
    }

    /// List all posts, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<PostResponse>, ApiError> {
        let posts = PostRepository::list_with_authors(pool).await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    /// Get a single post with its author
    pub async fn get(pool: &PgPool, id: i64) -> Result<PostResponse, ApiError> {
        PostRepository::find_with_author(pool, id)
            .await?
            .map(PostResponse::from)
            .ok_or_else(|| ApiError::NotFound("post not found".to_string()))
    }

    /// Create a post owned by `user_id`
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        req: CreatePostRequest,
    ) -> Result<PostResponse, ApiError> {
        Self::validate_post(&req.title, &req.content)?;

        let post = PostRepository::create(pool, user_id, &req.title, &req.content).await?;
        info!(post_id = post.id, user_id, "Post created");

        Ok(post.into())
    }

    /// Update a post owned by `user_id`
    pub async fn update(
        pool: &PgPool,
        user_id: i64,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostResponse, ApiError> {
        let post = Self::find_owned(pool, user_id, id).await?;
        Self::validate_post(&req.title, &req.content)?;

        let updated = PostRepository::update(pool, post.id, &req.title, &req.content)
            .await?
            .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;
        info!(post_id = id, user_id, "Post updated");

        Ok(updated.into())
    }

    /// Delete a post owned by `user_id`
    pub async fn delete(
        pool: &PgPool,
        user_id: i64,
        id: i64,
    ) -> Result<DeletePostResponse, ApiError> {
        let post = Self::find_owned(pool, user_id, id).await?;

        if !PostRepository::delete(pool, post.id).await? {
            return Err(ApiError::NotFound("post not found".to_string()));
        }
        info!(post_id = id, user_id, "Post deleted");

        Ok(DeletePostResponse { deleted: true, id })
    }

    async fn find_owned(pool: &PgPool, user_id: i64, id: i64) -> Result<PostRecord, ApiError> {
        let post = PostRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;
        Self::ensure_author(&post, user_id)?;
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post_by(user_id: i64) -> PostRecord {
        PostRecord {
            id: 1,
            user_id,
            title: "Title".to_string(),
            content: "Body".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_author_may_edit() {
        assert!(PostService::ensure_author(&post_by(7), 7).is_ok());
    }

    #[test]
    fn test_other_user_is_forbidden() {
        let err = PostService::ensure_author(&post_by(7), 8).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(msg) if msg == "you are not the author of this post"));
    }

    #[test]
    fn test_validate_post() {
        assert!(PostService::validate_post("Hello", "World").is_ok());
        assert_eq!(
            PostService::validate_post("", "World").unwrap_err().field,
            "title"
        );
        assert_eq!(
            PostService::validate_post("Hello", "   ").unwrap_err().field,
            "content"
        );
    }
}
