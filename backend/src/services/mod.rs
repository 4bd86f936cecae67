//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the auth core.

pub mod comment;
pub mod post;
pub mod user;

pub use comment::CommentService;
pub use post::PostService;
pub use user::UserService;
