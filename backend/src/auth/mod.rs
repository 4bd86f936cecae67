//! Authentication module
//!
//! Provides bcrypt password hashing, HS256 bearer tokens and the middleware
//! that enforces them on protected routes.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtService, TokenError, DEFAULT_TOKEN_TTL_SECS};
pub use middleware::{authenticate, require_auth, AuthRejection, AuthUser};
pub use password::{PasswordError, PasswordService};
