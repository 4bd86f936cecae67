//! Comment repository for database operations

use anyhow::Result;
use blog_shared::types::{AuthorSummary, CommentResponse};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Comment record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author's public fields
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_username: String,
    pub author_email: String,
}

impl From<CommentRecord> for CommentResponse {
    fn from(comment: CommentRecord) -> Self {
        CommentResponse {
            id: comment.id,
            content: comment.content,
            user_id: comment.user_id,
            post_id: comment.post_id,
            author: None,
            created: comment.created_at,
        }
    }
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(comment: CommentWithAuthor) -> Self {
        CommentResponse {
            id: comment.id,
            content: comment.content,
            user_id: comment.user_id,
            post_id: comment.post_id,
            author: Some(AuthorSummary {
                id: comment.user_id,
                username: comment.author_username,
                email: comment.author_email,
            }),
            created: comment.created_at,
        }
    }
}

/// Comment repository for database operations
pub struct CommentRepository;

impl CommentRepository {
    /// Create a comment on a post
    pub async fn create(
        pool: &PgPool,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentRecord> {
        let record = sqlx::query_as::<_, CommentRecord>(
            r#"
            INSERT INTO comments (post_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, user_id, content, created_at
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// List comments on a post with authors, oldest first
    pub async fn list_for_post(pool: &PgPool, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let records = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.post_id, c.user_id, c.content, c.created_at,
                   u.username AS author_username, u.email AS author_email
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
