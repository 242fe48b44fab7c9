use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PolicyServiceError;
use crate::state::AppState;
use crate::usecase::authcode::{
    LoginGrant, SendLoginCodeInput, SendLoginCodeUseCase, VerifyLoginCodeInput,
    VerifyLoginCodeUseCase, VerifyLoginLinkInput, VerifyLoginLinkUseCase,
};

#[derive(Deserialize)]
pub struct SendCodeRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: &'static str,
    pub workspace_id: Uuid,
    pub department: Option<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: u64,
    pub user: UserResponse,
}

impl From<LoginGrant> for TokenResponse {
    fn from(grant: LoginGrant) -> Self {
        Self {
            access_token: grant.access_token,
            token_type: "bearer",
            expires_at: grant.expires_at,
            user: UserResponse {
                id: grant.user.id,
                email: grant.user.email,
                name: grant.user.name,
                role: grant.user.role.as_str(),
                workspace_id: grant.user.workspace_id,
                department: grant.user.department,
            },
        }
    }
}

pub async fn send_login_code(
    State(state): State<AppState>,
    Json(body): Json<SendCodeRequest>,
) -> Result<StatusCode, PolicyServiceError> {
    let usecase = SendLoginCodeUseCase {
        users: state.user_repo(),
        challenges: state.challenge_repo(),
        notifier: state.notifier(),
    };
    usecase
        .execute(SendLoginCodeInput { email: body.email })
        .await?;
    Ok(StatusCode::ACCEPTED)
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify_login_code(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<TokenResponse>, PolicyServiceError> {
    let usecase = VerifyLoginCodeUseCase {
        users: state.user_repo(),
        challenges: state.challenge_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let grant = usecase
        .execute(VerifyLoginCodeInput {
            email: body.email,
            code: body.code,
        })
        .await?;
    Ok(Json(grant.into()))
}

#[derive(Deserialize)]
pub struct VerifyLinkRequest {
    pub magic_id: String,
}

pub async fn verify_login_link(
    State(state): State<AppState>,
    Json(body): Json<VerifyLinkRequest>,
) -> Result<Json<TokenResponse>, PolicyServiceError> {
    let usecase = VerifyLoginLinkUseCase {
        users: state.user_repo(),
        challenges: state.challenge_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let grant = usecase
        .execute(VerifyLoginLinkInput {
            magic_id: body.magic_id,
        })
        .await?;
    Ok(Json(grant.into()))
}
