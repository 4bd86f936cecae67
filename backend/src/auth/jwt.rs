//! JWT token issuance and validation
//!
//! Tokens are compact HS256 JWTs carrying `sub` (integer user id), `usr`
//! (username), `iat` and `exp`. Nothing is stored server-side: a token is
//! valid exactly when its signature checks out against the configured
//! secret, it has not expired, and its claims have the expected shape.
//!
//! Keys are derived once from the secret and shared behind `Arc`s.

use crate::config::JwtConfig;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Default validity window for issued tokens (24 hours)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Identity claims embedded in a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: i64,
    /// Username
    pub usr: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Token issuance and validation failures
///
/// The distinctions are for logs and tests. At the HTTP boundary every
/// validation failure collapses into a single "invalid or expired token"
/// rejection, see `auth::middleware`.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    Config,

    #[error("failed to encode token: {0}")]
    Encoding(String),

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("token signature or algorithm rejected")]
    Signature,

    #[error("token expired")]
    Expired,

    #[error("invalid token claims: {0}")]
    ClaimShape(String),
}

impl TokenError {
    /// Stable label for structured logging
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Config => "config",
            TokenError::Encoding(_) => "encoding",
            TokenError::MalformedToken(_) => "malformed_token",
            TokenError::Signature => "signature",
            TokenError::Expired => "expired",
            TokenError::ClaimShape(_) => "claim_shape",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::Signature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::MalformedToken(err.to_string()),
        }
    }
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// JWT service for token operations
///
/// Built once at startup from configuration and stored in `AppState`.
/// Without a secret the service still exists but refuses to issue or
/// validate anything.
#[derive(Clone)]
pub struct JwtService {
    keys: Option<JwtKeys>,
    ttl: Duration,
}

impl JwtService {
    /// Create a service from a raw secret; an empty secret leaves it unconfigured
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let keys = (!secret.is_empty()).then(|| JwtKeys::new(secret.as_bytes()));
        Self {
            keys,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Create a service from the `[jwt]` configuration section
    pub fn from_config(config: &JwtConfig) -> Self {
        let secret = config
            .secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .unwrap_or_default();
        Self::new(secret, config.token_ttl_secs)
    }

    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    /// Token lifetime in seconds
    #[inline]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    fn keys(&self) -> Result<&JwtKeys, TokenError> {
        self.keys.as_ref().ok_or(TokenError::Config)
    }

    /// Issue a token for a user, valid from now
    #[inline]
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, username, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let keys = self.keys()?;
        let claims = Claims {
            sub: user_id,
            usr: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, keys.encoding())
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validate a token against the current time
    #[inline]
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`
    ///
    /// Checks run in order: structure and signature (only `HS256` is
    /// accepted), expiry, then claim shape.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let keys = self.keys()?;

        // Expiry and claim checks happen below against the supplied clock
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let raw = decode::<Map<String, Value>>(token, keys.decoding(), &validation)?.claims;

        let exp = integer_claim(&raw, "exp")?;
        if now.timestamp() >= exp {
            return Err(TokenError::Expired);
        }

        let sub = integer_claim(&raw, "sub")?;
        if sub <= 0 {
            return Err(TokenError::ClaimShape("sub must be a positive integer".to_string()));
        }
        let usr = match raw.get("usr") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(_) => {
                return Err(TokenError::ClaimShape("usr must be a non-empty string".to_string()))
            }
            None => return Err(TokenError::ClaimShape("missing usr".to_string())),
        };
        let iat = integer_claim(&raw, "iat")?;

        Ok(Claims { sub, usr, iat, exp })
    }
}

/// Read a claim that must be a JSON integer; floats are rejected
fn integer_claim(claims: &Map<String, Value>, name: &str) -> Result<i64, TokenError> {
    match claims.get(name) {
        Some(value) => value
            .as_i64()
            .ok_or_else(|| TokenError::ClaimShape(format!("{} must be an integer", name))),
        None => Err(TokenError::ClaimShape(format!("missing {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_encoding::BASE64URL_NOPAD;
    use proptest::prelude::*;
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn create_test_service() -> JwtService {
        JwtService::new(SECRET, DEFAULT_TOKEN_TTL_SECS)
    }

    /// Sign arbitrary claims with an arbitrary header, bypassing `issue`
    fn forge(header: Header, claims: &Value, secret: &str) -> String {
        encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn valid_claims() -> Value {
        let now = Utc::now().timestamp();
        json!({ "sub": 42, "usr": "alice", "iat": now, "exp": now + 3600 })
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();

        let token = service.issue(42, "alice").unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.usr, "alice");
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_token_has_three_segments_and_hs256_header() {
        let token = create_test_service().issue(1, "bob").unwrap();

        assert_eq!(token.split('.').count(), 3);
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_sub_is_encoded_as_integer() {
        let token = create_test_service().issue(7, "carol").unwrap();
        let payload = token.split('.').nth(1).unwrap();
        let decoded = BASE64URL_NOPAD.decode(payload.as_bytes()).unwrap();
        let claims: Value = serde_json::from_slice(&decoded).unwrap();

        assert!(claims["sub"].is_i64());
        assert_eq!(claims["usr"], "carol");
    }

    #[test]
    fn test_expired_after_ttl() {
        let service = create_test_service();
        let issued_at = Utc::now();
        let token = service.issue_at(42, "alice", issued_at).unwrap();

        let just_before = issued_at + Duration::seconds(DEFAULT_TOKEN_TTL_SECS - 1);
        assert!(service.validate_at(&token, just_before).is_ok());

        let at_expiry = issued_at + Duration::seconds(DEFAULT_TOKEN_TTL_SECS);
        assert!(matches!(
            service.validate_at(&token, at_expiry),
            Err(TokenError::Expired)
        ));

        let day_later = issued_at + Duration::hours(25);
        assert!(matches!(
            service.validate_at(&token, day_later),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_wrong_secret_is_signature_error() {
        let token = JwtService::new("secret-a", 3600).issue(1, "alice").unwrap();
        let result = JwtService::new("secret-b", 3600).validate(&token);

        assert!(matches!(result, Err(TokenError::Signature)));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let service = create_test_service();
        let token = service.issue(1, "alice").unwrap();
        let (message, signature) = token.rsplit_once('.').unwrap();
        let first = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", message, first, &signature[1..]);

        assert!(matches!(
            service.validate(&tampered),
            Err(TokenError::Signature)
        ));
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let service = create_test_service();
        let token = service.issue(1, "alice").unwrap();
        let other = service.issue(2, "mallory").unwrap();

        // Splice mallory's claims under alice's signature
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(
            service.validate(&spliced),
            Err(TokenError::Signature)
        ));
    }

    #[test]
    fn test_non_hs256_algorithm_rejected() {
        let service = create_test_service();

        // Correctly signed with the shared secret, but declaring another MAC width
        let hs512 = forge(Header::new(Algorithm::HS512), &valid_claims(), SECRET);
        assert!(matches!(service.validate(&hs512), Err(TokenError::Signature)));

        // Header rewritten to an asymmetric scheme, original signature kept
        let token = service.issue(1, "alice").unwrap();
        let (_, rest) = token.split_once('.').unwrap();
        let rs256_header = BASE64URL_NOPAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let downgraded = format!("{}.{}", rs256_header, rest);
        assert!(service.validate(&downgraded).is_err());
        assert!(matches!(
            service.validate(&downgraded),
            Err(TokenError::Signature)
        ));
    }

    #[test]
    fn test_alg_none_rejected() {
        let service = create_test_service();
        let token = service.issue(1, "alice").unwrap();
        let (_, rest) = token.split_once('.').unwrap();
        let none_header = BASE64URL_NOPAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let unsigned = format!("{}.{}", none_header, rest);

        assert!(service.validate(&unsigned).is_err());
    }

    #[test]
    fn test_malformed_tokens() {
        let service = create_test_service();

        for token in ["", "invalid", "invalid.token", "a.b.c.d", "invalid.token.here"] {
            let result = service.validate(token);
            assert!(
                matches!(result, Err(TokenError::MalformedToken(_))),
                "expected malformed for {:?}, got {:?}",
                token,
                result
            );
        }
    }

    #[test]
    fn test_claim_shape_errors() {
        let service = create_test_service();
        let now = Utc::now().timestamp();

        let cases = [
            json!({ "usr": "alice", "iat": now, "exp": now + 60 }),
            json!({ "sub": 1, "iat": now, "exp": now + 60 }),
            json!({ "sub": "1", "usr": "alice", "iat": now, "exp": now + 60 }),
            json!({ "sub": 1.5, "usr": "alice", "iat": now, "exp": now + 60 }),
            json!({ "sub": -3, "usr": "alice", "iat": now, "exp": now + 60 }),
            json!({ "sub": 1, "usr": 99, "iat": now, "exp": now + 60 }),
            json!({ "sub": 1, "usr": "", "iat": now, "exp": now + 60 }),
            json!({ "sub": 1, "usr": "alice", "exp": now + 60 }),
            json!({ "sub": 1, "usr": "alice", "iat": now }),
        ];

        for claims in cases {
            let token = forge(Header::new(Algorithm::HS256), &claims, SECRET);
            let result = service.validate(&token);
            assert!(
                matches!(result, Err(TokenError::ClaimShape(_))),
                "expected claim shape error for {}, got {:?}",
                claims,
                result
            );
        }
    }

    #[test]
    fn test_unconfigured_service_refuses_everything() {
        let service = JwtService::new("", DEFAULT_TOKEN_TTL_SECS);
        assert!(!service.is_configured());

        assert!(matches!(service.issue(1, "alice"), Err(TokenError::Config)));

        let token = create_test_service().issue(1, "alice").unwrap();
        assert!(matches!(service.validate(&token), Err(TokenError::Config)));
    }

    #[test]
    fn test_from_config_without_secret_is_unconfigured() {
        let config = JwtConfig {
            secret: None,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        };
        assert!(!JwtService::from_config(&config).is_configured());
    }

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(TokenError::Expired.kind(), "expired");
        assert_eq!(TokenError::Signature.kind(), "signature");
        assert_eq!(TokenError::ClaimShape(String::new()).kind(), "claim_shape");
    }

    #[test]
    fn test_service_is_clone_cheap() {
        let service = create_test_service();
        let cloned = service.clone();
        let token = service.issue(3, "dave").unwrap();
        assert_eq!(cloned.validate(&token).unwrap().sub, 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_issue_then_validate_roundtrips_identity(
            user_id in 1i64..i64::MAX / 2,
            username in "[a-zA-Z0-9_]{3,64}"
        ) {
            let service = create_test_service();
            let token = service.issue(user_id, &username).unwrap();
            let claims = service.validate(&token).unwrap();
            prop_assert_eq!(claims.sub, user_id);
            prop_assert_eq!(claims.usr, username);
        }
    }
}
