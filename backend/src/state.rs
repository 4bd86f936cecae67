//! Shared handler state
//!
//! Built once in `main` after configuration has been validated, then cloned
//! into every request. Nothing in it changes while the server runs: the token
//! service holds the only copy of the signing keys, and rotating the secret
//! means restarting the process.

use crate::auth::{JwtService, PasswordService};
use crate::config::AppConfig;
use sqlx::PgPool;
use std::sync::Arc;

/// State extracted by handlers and the auth middleware
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token service built from the configured secret
    pub jwt: JwtService,
    /// Password hasher with the configured work factor
    pub passwords: PasswordService,
}

impl AppState {
    /// Build the token service and hasher from `config`
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        let jwt = JwtService::from_config(&config.jwt);
        let passwords = PasswordService::new(config.auth.bcrypt_cost);

        Self {
            db,
            config: Arc::new(config),
            jwt,
            passwords,
        }
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Get the password hasher
    #[inline]
    pub fn passwords(&self) -> PasswordService {
        self.passwords
    }
}
