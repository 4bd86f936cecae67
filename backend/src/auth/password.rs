//! Password hashing using bcrypt
//!
//! Digests are self-describing (`$2b$<cost>$<salt><hash>`), so verification
//! needs nothing but the stored string and the candidate password.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. In async handlers use
//! `hash_async` / `verify_async`, which move the work onto the blocking
//! thread pool.

use bcrypt::BcryptError;
use thiserror::Error;

/// bcrypt only reads this many bytes of input and silently drops the rest
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Credential hashing failures
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Entropy or resource failure while producing a digest
    #[error("failed to hash password: {0}")]
    Hashing(String),

    /// The stored digest is not a recognised bcrypt string
    #[error("malformed password digest: {0}")]
    MalformedDigest(String),

    /// Input longer than bcrypt can hash without truncating
    #[error("password is {0} bytes, at most 72 allowed")]
    TooLong(usize),
}

impl From<BcryptError> for PasswordError {
    fn from(err: BcryptError) -> Self {
        match err {
            BcryptError::InvalidCost(_)
            | BcryptError::CostNotAllowed(_)
            | BcryptError::InvalidPrefix(_)
            | BcryptError::InvalidHash(_)
            | BcryptError::InvalidSaltLen(_)
            | BcryptError::InvalidBase64(_) => PasswordError::MalformedDigest(err.to_string()),
            other => PasswordError::Hashing(other.to_string()),
        }
    }
}

/// Password hashing service
///
/// Holds only the work factor, so it is `Copy` and can be moved into
/// blocking tasks freely.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordService {
    /// Create a hasher with the given bcrypt cost (4..=31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt (blocking operation)
    ///
    /// Passwords over `MAX_PASSWORD_BYTES` are refused rather than truncated.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong(password.len()));
        }
        bcrypt::hash(password, self.cost).map_err(|e| match e {
            // a bad cost here is our configuration, not a stored digest
            BcryptError::CostNotAllowed(cost) => {
                PasswordError::Hashing(format!("cost {} not allowed", cost))
            }
            other => PasswordError::from(other),
        })
    }

    /// Verify a candidate password against a stored digest (blocking operation)
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only when the digest itself
    /// cannot be used. The comparison is constant-time.
    ///
    /// A candidate over `MAX_PASSWORD_BYTES` never matches: no digest can
    /// have been produced from it, and bcrypt would compare only its prefix.
    pub fn verify(&self, digest: &str, candidate: &str) -> Result<bool, PasswordError> {
        let matched = bcrypt::verify(candidate, digest)?;
        Ok(matched && candidate.len() <= MAX_PASSWORD_BYTES)
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(self, password: String) -> Result<String, PasswordError> {
        tokio::task::spawn_blocking(move || self.hash(&password))
            .await
            .map_err(|e| PasswordError::Hashing(format!("task join error: {}", e)))?
    }

    /// Verify a password on the blocking thread pool
    pub async fn verify_async(
        self,
        digest: String,
        candidate: String,
    ) -> Result<bool, PasswordError> {
        tokio::task::spawn_blocking(move || self.verify(&digest, &candidate))
            .await
            .map_err(|e| PasswordError::Hashing(format!("task join error: {}", e)))?
    }
}
