//! Post repository for database operations

use anyhow::Result;
use blog_shared::types::{AuthorSummary, PostResponse};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Post record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRecord {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post joined with its author's public fields
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithAuthor {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_username: String,
    pub author_email: String,
}

impl From<PostRecord> for PostResponse {
    fn from(post: PostRecord) -> Self {
        PostResponse {
            id: post.id,
            title: post.title,
            content: post.content,
            user_id: post.user_id,
            author: None,
            created: post.created_at,
            updated: post.updated_at,
        }
    }
}

impl From<PostWithAuthor> for PostResponse {
    fn from(post: PostWithAuthor) -> Self {
        PostResponse {
            id: post.id,
            title: post.title,
            content: post.content,
            user_id: post.user_id,
            author: Some(AuthorSummary {
                id: post.user_id,
                username: post.author_username,
                email: post.author_email,
            }),
            created: post.created_at,
            updated: post.updated_at,
        }
    }
}

/// Post repository for database operations
pub struct PostRepository;

impl PostRepository {
    /// Create a new post owned by `user_id`
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        title: &str,
        content: &str,
    ) -> Result<PostRecord> {
        let record = sqlx::query_as::<_, PostRecord>(
            r#"
            INSERT INTO posts (user_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, content, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// List all posts with authors, newest first
    pub async fn list_with_authors(pool: &PgPool) -> Result<Vec<PostWithAuthor>> {
        let records = sqlx::query_as::<_, PostWithAuthor>(
            r#"
            SELECT p.id, p.user_id, p.title, p.content, p.created_at, p.updated_at,
                   u.username AS author_username, u.email AS author_email
            FROM posts p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.id DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Get post by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<PostRecord>> {
        let record = sqlx::query_as::<_, PostRecord>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Get post by ID together with its author
    pub async fn find_with_author(pool: &PgPool, id: i64) -> Result<Option<PostWithAuthor>> {
        let record = sqlx::query_as::<_, PostWithAuthor>(
            r#"
            SELECT p.id, p.user_id, p.title, p.content, p.created_at, p.updated_at,
                   u.username AS author_username, u.email AS author_email
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Replace title and content of a post
    pub async fn update(
        pool: &PgPool,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<PostRecord>> {
        let record = sqlx::query_as::<_, PostRecord>(
            r#"
            UPDATE posts
            SET title = $2, content = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Delete a post; its comments go with it
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
