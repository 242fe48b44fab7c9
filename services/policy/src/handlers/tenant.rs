//! Bearer-token tenant extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::domain::types::{Tenant, UserRole};
use crate::error::PolicyServiceError;
use crate::state::AppState;

/// Derive the tenant context from the `Authorization: Bearer` access token.
/// This is the only place a request's workspace scope is established; every
/// admin handler takes a `Tenant` parameter and passes it down.
impl FromRequestParts<AppState> for Tenant {
    type Rejection = PolicyServiceError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);
        let jwt_secret = state.jwt_secret.clone();

        async move {
            let token = token.ok_or(PolicyServiceError::InvalidCredential)?;
            let claims = attest_token::verify_access_token(&token, &jwt_secret)?;

            let user_id = Uuid::parse_str(&claims.sub)
                .map_err(|_| PolicyServiceError::InvalidCredential)?;
            let workspace_id = Uuid::parse_str(&claims.workspace_id)
                .map_err(|_| PolicyServiceError::InvalidCredential)?;
            let role = UserRole::from_str(&claims.role)
                .ok_or(PolicyServiceError::InvalidCredential)?;

            Ok(Tenant {
                user_id,
                workspace_id,
                role,
            })
        }
    }
}

/// Admin gate for management endpoints.
pub fn require_admin(tenant: Tenant) -> Result<Tenant, PolicyServiceError> {
    if tenant.is_admin() {
        Ok(tenant)
    } else {
        Err(PolicyServiceError::Forbidden)
    }
}
