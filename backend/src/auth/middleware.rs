//! Authentication middleware
//!
//! Every protected request goes through the same steps:
//!
//! 1. read the `Authorization` header (absent: `MissingCredential`)
//! 2. split it into scheme and token on the first whitespace
//!    (anything but exactly two parts: `MalformedHeader`)
//! 3. require the `Bearer` scheme, case-insensitively (`WrongScheme`)
//! 4. validate the token (any failure: `InvalidOrExpiredToken`)
//! 5. bind the verified identity into the request extensions
//!
//! Handlers take identity from `AuthUser` only, never from request bodies.

use crate::auth::jwt::{JwtService, TokenError};
use crate::state::AppState;
use axum::{
    extract::{FromRef, Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        request::Parts,
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use blog_shared::types::{ErrorDetail, ErrorResponse};
use thiserror::Error;
use tracing::{debug, error};

/// Identity bound to a request after successful authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

/// Why a request was refused by the auth layer
///
/// The token error is kept for logging; clients only ever see the
/// collapsed `INVALID_TOKEN` response.
#[derive(Debug, Error)]
pub enum AuthRejection {
    #[error("missing Authorization header")]
    MissingCredential,

    #[error("invalid Authorization header format")]
    MalformedHeader,

    #[error("Authorization scheme must be Bearer")]
    WrongScheme,

    #[error("invalid or expired token")]
    InvalidOrExpiredToken(#[source] TokenError),

    #[error("authentication is not configured")]
    Misconfigured,
}

impl AuthRejection {
    /// Boundary mapping from rejection reason to status, code and message
    pub fn status_and_code(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            AuthRejection::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                "MISSING_CREDENTIAL",
                "missing Authorization header",
            ),
            AuthRejection::MalformedHeader => (
                StatusCode::UNAUTHORIZED,
                "MALFORMED_HEADER",
                "invalid Authorization header format",
            ),
            AuthRejection::WrongScheme => (
                StatusCode::UNAUTHORIZED,
                "WRONG_SCHEME",
                "Authorization scheme must be Bearer",
            ),
            AuthRejection::InvalidOrExpiredToken(_) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "invalid or expired token",
            ),
            AuthRejection::Misconfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "authentication is not configured",
            ),
        }
    }

    /// Internal reason label, more precise than the response code
    pub fn reason(&self) -> &'static str {
        match self {
            AuthRejection::MissingCredential => "missing_credential",
            AuthRejection::MalformedHeader => "malformed_header",
            AuthRejection::WrongScheme => "wrong_scheme",
            AuthRejection::InvalidOrExpiredToken(err) => err.kind(),
            AuthRejection::Misconfigured => "misconfigured",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_and_code();
        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
                field: None,
            },
        });

        if status == StatusCode::UNAUTHORIZED {
            (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Split a credential header into `(scheme, token)`
///
/// Returns `None` unless there are exactly two whitespace-separated parts.
/// A token with embedded whitespace (`Bearer a b`) is therefore a malformed
/// header, never passed on for validation; both outcomes are 401.
fn split_credentials(value: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = value.trim().split_once(char::is_whitespace)?;
    let token = rest.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some((scheme, token))
}

/// Run the header checks and token validation for one request
pub fn authenticate(
    header: Option<&HeaderValue>,
    jwt: &JwtService,
) -> Result<AuthUser, AuthRejection> {
    let header = header.ok_or(AuthRejection::MissingCredential)?;
    if header.is_empty() {
        return Err(AuthRejection::MissingCredential);
    }
    let value = header
        .to_str()
        .map_err(|_| AuthRejection::MalformedHeader)?;

    let (scheme, token) = split_credentials(value).ok_or(AuthRejection::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthRejection::WrongScheme);
    }

    let claims = jwt.validate(token).map_err(|err| match err {
        TokenError::Config => AuthRejection::Misconfigured,
        other => AuthRejection::InvalidOrExpiredToken(other),
    })?;

    Ok(AuthUser {
        user_id: claims.sub,
        username: claims.usr,
    })
}

fn log_rejection(rejection: &AuthRejection, method: &str, path: &str) {
    match rejection {
        AuthRejection::Misconfigured => {
            error!(method, path, "Rejected request: JWT secret not configured");
        }
        other => {
            debug!(
                method,
                path,
                reason = other.reason(),
                "Rejected unauthenticated request"
            );
        }
    }
}

/// Middleware that requires a valid bearer token
///
/// Apply with `axum::middleware::from_fn_with_state` to a group of routes.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let user = authenticate(request.headers().get(AUTHORIZATION), state.jwt()).map_err(
        |rejection| {
            log_rejection(&rejection, request.method().as_str(), request.uri().path());
            rejection
        },
    )?;

    debug!(user_id = user.user_id, "Request authenticated");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extractor for the authenticated user
///
/// Reads the identity bound by `require_auth`. On routes that are not
/// behind the middleware it runs the same checks itself.
#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let app_state = AppState::from_ref(state);
        authenticate(parts.headers.get(AUTHORIZATION), app_state.jwt()).map_err(|rejection| {
            log_rejection(&rejection, parts.method.as_str(), parts.uri.path());
            rejection
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::DEFAULT_TOKEN_TTL_SECS;
    use chrono::{Duration, Utc};
    use rstest::rstest;

    fn jwt() -> JwtService {
        JwtService::new("middleware-test-secret", DEFAULT_TOKEN_TTL_SECS)
    }

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    #[test]
    fn test_missing_header() {
        let result = authenticate(None, &jwt());
        assert!(matches!(result, Err(AuthRejection::MissingCredential)));

        let empty = header("");
        let result = authenticate(Some(&empty), &jwt());
        assert!(matches!(result, Err(AuthRejection::MissingCredential)));
    }

    #[rstest]
    #[case("Bearer")]
    #[case("Bearer   ")]
    #[case("token-without-scheme")]
    #[case("Bearer a b")]
    fn test_malformed_header(#[case] value: &str) {
        let value = header(value);
        let result = authenticate(Some(&value), &jwt());
        assert!(matches!(result, Err(AuthRejection::MalformedHeader)));
    }

    #[test]
    fn test_non_ascii_header_is_malformed() {
        let value = HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap();
        let result = authenticate(Some(&value), &jwt());
        assert!(matches!(result, Err(AuthRejection::MalformedHeader)));
    }

    #[rstest]
    #[case("Basic abc")]
    #[case("Token abc.def.ghi")]
    #[case("Bearer: abc")]
    fn test_wrong_scheme(#[case] value: &str) {
        let value = header(value);
        let result = authenticate(Some(&value), &jwt());
        assert!(matches!(result, Err(AuthRejection::WrongScheme)));
    }

    #[rstest]
    #[case("Bearer")]
    #[case("bearer")]
    #[case("BEARER")]
    fn test_valid_token_binds_identity(#[case] scheme: &str) {
        let service = jwt();
        let token = service.issue(42, "alice").unwrap();
        let value = header(&format!("{} {}", scheme, token));

        let user = authenticate(Some(&value), &service).unwrap();
        assert_eq!(
            user,
            AuthUser {
                user_id: 42,
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_tampered_signature_is_invalid_token() {
        let service = jwt();
        let token = service.issue(42, "alice").unwrap();
        let (message, signature) = token.rsplit_once('.').unwrap();
        let first = if signature.starts_with('x') { 'y' } else { 'x' };
        let value = header(&format!("Bearer {}.{}{}", message, first, &signature[1..]));

        let result = authenticate(Some(&value), &service);
        assert!(matches!(
            result,
            Err(AuthRejection::InvalidOrExpiredToken(TokenError::Signature))
        ));
    }

    #[test]
    fn test_expired_token_collapses_to_invalid_token() {
        let service = jwt();
        let issued = Utc::now() - Duration::hours(25);
        let token = service.issue_at(42, "alice", issued).unwrap();
        let value = header(&format!("Bearer {}", token));

        let rejection = authenticate(Some(&value), &service).unwrap_err();
        assert_eq!(rejection.reason(), "expired");
        assert_eq!(rejection.status_and_code().1, "INVALID_TOKEN");
    }

    #[test]
    fn test_unconfigured_service_is_server_error() {
        let token = jwt().issue(1, "alice").unwrap();
        let value = header(&format!("Bearer {}", token));
        let unconfigured = JwtService::new("", DEFAULT_TOKEN_TTL_SECS);

        let rejection = authenticate(Some(&value), &unconfigured).unwrap_err();
        assert!(matches!(rejection, AuthRejection::Misconfigured));
        assert_eq!(
            rejection.status_and_code().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_all_token_failures_share_one_response() {
        let failures = [
            TokenError::MalformedToken("bad".to_string()),
            TokenError::Signature,
            TokenError::Expired,
            TokenError::ClaimShape("missing usr".to_string()),
        ];

        for err in failures {
            let rejection = AuthRejection::InvalidOrExpiredToken(err);
            assert_eq!(
                rejection.status_and_code(),
                (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_TOKEN",
                    "invalid or expired token"
                )
            );
        }
    }

    #[test]
    fn test_unauthorized_response_carries_challenge() {
        let response = AuthRejection::WrongScheme.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    }
}
