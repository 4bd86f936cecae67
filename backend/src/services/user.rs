//! User service for registration and login
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on blocking thread pool
//! - JWT service is passed by reference (pre-computed keys)

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::UserRepository;
use blog_shared::types::{LoginRequest, RegisterRequest, RegisterResponse, TokenResponse};
use blog_shared::validation::{validate_email, validate_password, validate_username};
use blog_shared::ValidationError;
use sqlx::PgPool;
use tracing::info;

const INVALID_CREDENTIALS: &str = "invalid username or password";

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Check a registration request before touching the database
    pub fn validate_registration(req: &RegisterRequest) -> Result<(), ValidationError> {
        ValidationError::check("username", validate_username(&req.username))?;
        ValidationError::check("password", validate_password(&req.password))?;
        ValidationError::check("email", validate_email(&req.email))?;
        Ok(())
    }

    /// Register a new user
    ///
    /// # Performance
    /// Password hashing is offloaded to blocking thread pool via `spawn_blocking`.
    pub async fn register(
        pool: &PgPool,
        passwords: PasswordService,
        req: RegisterRequest,
    ) -> Result<RegisterResponse, ApiError> {
        Self::validate_registration(&req)?;

        if UserRepository::username_or_email_exists(pool, &req.username, &req.email).await? {
            return Err(ApiError::Conflict(
                "username or email already exists".to_string(),
            ));
        }

        // Hash password on blocking thread pool (CPU-intensive)
        let password_hash = passwords.hash_async(req.password).await?;

        let user = UserRepository::create(pool, &req.username, &req.email, &password_hash)
            .await?
            .ok_or_else(|| ApiError::Conflict("username or email already exists".to_string()))?;

        info!(user_id = user.id, username = %user.username, "User registered");

        Ok(RegisterResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    /// Login with username and password
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn login(
        pool: &PgPool,
        passwords: PasswordService,
        jwt_service: &JwtService,
        req: LoginRequest,
    ) -> Result<TokenResponse, ApiError> {
        let user = UserRepository::find_by_username(pool, &req.username)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        // Verify password on blocking thread pool (CPU-intensive)
        let valid = passwords
            .verify_async(user.password_hash, req.password)
            .await?;
        if !valid {
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = jwt_service.issue(user.id, &user.username)?;

        info!(user_id = user.id, username = %user.username, "User logged in");

        Ok(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_service.ttl_secs(),
        })
    }
}
