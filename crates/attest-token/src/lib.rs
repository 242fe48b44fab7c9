//! Kind-tagged JWT signing and verification.
//!
//! Two token kinds exist and are never interchangeable: `access` (login
//! session) and `magic_link` (acknowledgment link for one assignment). The
//! kind travels inside the signed payload, so a token minted for one purpose
//! fails closed when presented to an endpoint expecting the other.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Access-token lifetime: 7 days, matching the login session length.
pub const ACCESS_TOKEN_TTL_SECS: u64 = 7 * 24 * 3600;

/// Magic-link lifetime: 30 days. Links are reused across reminder sends for
/// the same assignment, so they outlive any single email.
pub const MAGIC_LINK_TTL_SECS: u64 = 30 * 24 * 3600;

/// Purpose tag carried inside every signed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    #[serde(rename = "access")]
    Access,
    #[serde(rename = "magic_link")]
    MagicLink,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::MagicLink => "magic_link",
        }
    }
}

/// Errors returned by token verification.
///
/// `Expired` and the rest are distinguished so callers can show different
/// user-facing messages, but every variant means the request is rejected.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("wrong token kind")]
    WrongKind,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("malformed token")]
    Malformed,
}

/// Claims for a login-session token (`kind = "access"`).
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID (UUID string).
    pub sub: String,
    pub email: String,
    /// Role wire value ("admin" | "employee").
    pub role: String,
    /// Tenant scope (workspace UUID string).
    pub workspace_id: String,
    pub iat: u64,
    pub exp: u64,
    pub kind: TokenKind,
}

/// Claims for an assignment acknowledgment link (`kind = "magic_link"`).
#[derive(Debug, Serialize, Deserialize)]
pub struct MagicLinkClaims {
    /// Assignment ID (UUID string).
    pub assignment_id: String,
    /// Recipient email the link was issued for.
    pub user_email: String,
    pub iat: u64,
    pub exp: u64,
    pub kind: TokenKind,
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

fn sign<C: Serialize>(claims: &C, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| TokenError::Malformed)
}

/// Mint an access token. Returns the token and its expiry (epoch seconds).
pub fn sign_access_token(
    user_id: Uuid,
    email: &str,
    role: &str,
    workspace_id: Uuid,
    secret: &str,
) -> Result<(String, u64), TokenError> {
    let iat = now_secs();
    let exp = iat + ACCESS_TOKEN_TTL_SECS;
    let claims = AccessClaims {
        sub: user_id.to_string(),
        email: email.to_owned(),
        role: role.to_owned(),
        workspace_id: workspace_id.to_string(),
        iat,
        exp,
        kind: TokenKind::Access,
    };
    Ok((sign(&claims, secret)?, exp))
}

/// Mint a magic-link token scoped to one assignment and recipient.
pub fn sign_magic_link_token(
    assignment_id: Uuid,
    user_email: &str,
    secret: &str,
) -> Result<String, TokenError> {
    let iat = now_secs();
    let claims = MagicLinkClaims {
        assignment_id: assignment_id.to_string(),
        user_email: user_email.to_owned(),
        iat,
        exp: iat + MAGIC_LINK_TTL_SECS,
        kind: TokenKind::MagicLink,
    };
    sign(&claims, secret)
}

/// Decode the payload with signature validation only. Expiry is checked by
/// [`verify`] after the kind, so a wrong-kind token is always reported as
/// `WrongKind` rather than `Expired`.
fn decode_payload(token: &str, secret: &str) -> Result<serde_json::Value, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<serde_json::Value>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(data.claims)
}

fn verify<C: DeserializeOwned>(
    token: &str,
    expected: TokenKind,
    secret: &str,
) -> Result<C, TokenError> {
    let payload = decode_payload(token, secret)?;

    let kind = payload
        .get("kind")
        .and_then(|v| v.as_str())
        .ok_or(TokenError::Malformed)?;
    if kind != expected.as_str() {
        return Err(TokenError::WrongKind);
    }

    let exp = payload
        .get("exp")
        .and_then(|v| v.as_u64())
        .ok_or(TokenError::Malformed)?;
    if exp <= now_secs() {
        return Err(TokenError::Expired);
    }

    serde_json::from_value(payload).map_err(|_| TokenError::Malformed)
}

/// Validate an access token: signature, then kind, then expiry.
pub fn verify_access_token(token: &str, secret: &str) -> Result<AccessClaims, TokenError> {
    verify(token, TokenKind::Access, secret)
}

/// Validate a magic-link token: signature, then kind, then expiry.
pub fn verify_magic_link_token(token: &str, secret: &str) -> Result<MagicLinkClaims, TokenError> {
    verify(token, TokenKind::MagicLink, secret)
}
