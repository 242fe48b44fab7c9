use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Policy, Tenant};
use crate::error::PolicyServiceError;
use crate::handlers::tenant::require_admin;
use crate::state::AppState;
use crate::usecase::policy::{
    CreatePolicyInput, CreatePolicyUseCase, DeletePolicyUseCase, UpdatePolicyInput,
    UpdatePolicyUseCase,
};

#[derive(Serialize)]
pub struct PolicyResponse {
    pub id: Uuid,
    pub title: String,
    pub body_markdown: Option<String>,
    pub file_key: Option<String>,
    pub content_sha256: String,
    pub version: i32,
    pub due_at: Option<DateTime<Utc>>,
    pub require_typed_signature: bool,
    #[serde(serialize_with = "attest_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Policy> for PolicyResponse {
    fn from(policy: Policy) -> Self {
        Self {
            id: policy.id,
            title: policy.title,
            body_markdown: policy.body_markdown,
            file_key: policy.file_key,
            content_sha256: policy.content_sha256,
            version: policy.version,
            due_at: policy.due_at,
            require_typed_signature: policy.require_typed_signature,
            created_at: policy.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct CreatePolicyRequest {
    pub title: String,
    pub body_markdown: Option<String>,
    pub file_key: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub require_typed_signature: bool,
}

pub async fn create_policy(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(body): Json<CreatePolicyRequest>,
) -> Result<(StatusCode, Json<PolicyResponse>), PolicyServiceError> {
    let tenant = require_admin(tenant)?;
    let usecase = CreatePolicyUseCase {
        policies: state.policy_repo(),
        store: state.object_store(),
    };
    let policy = usecase
        .execute(CreatePolicyInput {
            tenant,
            title: body.title,
            body_markdown: body.body_markdown,
            file_key: body.file_key,
            due_at: body.due_at,
            require_typed_signature: body.require_typed_signature,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(policy.into())))
}

#[derive(Deserialize)]
pub struct UpdatePolicyRequest {
    pub title: Option<String>,
    pub body_markdown: Option<String>,
    pub file_key: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub require_typed_signature: Option<bool>,
}

pub async fn update_policy(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(policy_id): Path<Uuid>,
    Json(body): Json<UpdatePolicyRequest>,
) -> Result<Json<PolicyResponse>, PolicyServiceError> {
    let tenant = require_admin(tenant)?;
    let usecase = UpdatePolicyUseCase {
        policies: state.policy_repo(),
        store: state.object_store(),
    };
    let policy = usecase
        .execute(UpdatePolicyInput {
            tenant,
            policy_id,
            title: body.title,
            body_markdown: body.body_markdown,
            file_key: body.file_key,
            due_at: body.due_at,
            require_typed_signature: body.require_typed_signature,
        })
        .await?;
    Ok(Json(policy.into()))
}

pub async fn delete_policy(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(policy_id): Path<Uuid>,
) -> Result<StatusCode, PolicyServiceError> {
    let tenant = require_admin(tenant)?;
    let usecase = DeletePolicyUseCase {
        policies: state.policy_repo(),
    };
    usecase.execute(tenant, policy_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
