//! Portal JWTs: one HS256 secret signs both the access and the refresh token,
//! told apart by the `typ` claim.

use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
#[cfg(any(feature = "issuer", test))]
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_domain::user::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Identity carried by a validated token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub role: UserRole,
    pub exp: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("expected {expected:?} token")]
    WrongKind { expected: TokenKind },
    #[error("token encoding failed")]
    Encoding,
}

/// Claims payload.
///
/// | Claim  | Type          | Meaning                                   |
/// |--------|---------------|-------------------------------------------|
/// | `sub`  | UUID string   | user id                                   |
/// | `role` | `u8`          | [`UserRole`] wire value at issue time     |
/// | `typ`  | string        | `access` or `refresh`                     |
/// | `exp`  | unix seconds  | expiry                                    |
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid,
    pub role: u8,
    pub typ: TokenKind,
    pub exp: u64,
}

fn decode_claims(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })
}

fn validate(token: &str, secret: &str, expected: TokenKind) -> Result<TokenInfo, AuthError> {
    let claims = decode_claims(token, secret)?;
    if claims.typ != expected {
        return Err(AuthError::WrongKind { expected });
    }
    let role = UserRole::from_u8(claims.role).ok_or(AuthError::Malformed)?;
    Ok(TokenInfo {
        user_id: claims.sub,
        role,
        exp: claims.exp,
    })
}

/// Validate an access-token cookie value. Refresh tokens are rejected.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    validate(token, secret, TokenKind::Access)
}

/// Validate a refresh-token cookie value. Access tokens are rejected.
#[cfg(any(feature = "issuer", test))]
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    validate(token, secret, TokenKind::Refresh)
}

/// Sign a token of the given kind expiring at `exp` (unix seconds).
#[cfg(any(feature = "issuer", test))]
pub fn issue_token(
    user_id: Uuid,
    role: UserRole,
    kind: TokenKind,
    exp: u64,
    secret: &str,
) -> Result<String, AuthError> {
    let claims = JwtClaims {
        sub: user_id,
        role: role.as_u8(),
        typ: kind,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::Encoding)
}
