//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod comment;
pub mod post;
pub mod user;

pub use comment::{CommentRecord, CommentRepository, CommentWithAuthor};
pub use post::{PostRecord, PostRepository, PostWithAuthor};
pub use user::{UserRecord, UserRepository};
