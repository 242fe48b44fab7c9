use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::Tenant;
use crate::error::PolicyServiceError;
use crate::handlers::tenant::require_admin;
use crate::state::AppState;
use crate::usecase::assignment::{
    AddRecipientsInput, AddRecipientsUseCase, DeleteAssignmentUseCase, SendAssignmentEmailsUseCase,
};
use crate::usecase::reminder::{BulkRemindUseCase, SendReminderUseCase};

#[derive(Deserialize)]
pub struct AddRecipientsRequest {
    pub emails: Vec<String>,
}

#[derive(Serialize)]
pub struct AddRecipientsResponse {
    pub added: Vec<Uuid>,
    pub duplicates: Vec<String>,
}

pub async fn add_recipients(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(policy_id): Path<Uuid>,
    Json(body): Json<AddRecipientsRequest>,
) -> Result<(StatusCode, Json<AddRecipientsResponse>), PolicyServiceError> {
    let tenant = require_admin(tenant)?;
    let usecase = AddRecipientsUseCase {
        users: state.user_repo(),
        policies: state.policy_repo(),
        assignments: state.assignment_repo(),
    };
    let outcome = usecase
        .execute(AddRecipientsInput {
            tenant,
            policy_id,
            emails: body.emails,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AddRecipientsResponse {
            added: outcome.added,
            duplicates: outcome.duplicates,
        }),
    ))
}

#[derive(Serialize)]
pub struct SendEmailsResponse {
    pub sent: u32,
    pub failed: Vec<String>,
}

pub async fn send_assignment_emails(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(policy_id): Path<Uuid>,
) -> Result<Json<SendEmailsResponse>, PolicyServiceError> {
    let tenant = require_admin(tenant)?;
    let usecase = SendAssignmentEmailsUseCase {
        users: state.user_repo(),
        policies: state.policy_repo(),
        assignments: state.assignment_repo(),
        notifier: state.notifier(),
        jwt_secret: state.jwt_secret.clone(),
        frontend_url: state.frontend_url.clone(),
    };
    let outcome = usecase.execute(tenant, policy_id).await?;
    Ok(Json(SendEmailsResponse {
        sent: outcome.sent,
        failed: outcome.failed,
    }))
}

pub async fn send_reminder(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(assignment_id): Path<Uuid>,
) -> Result<StatusCode, PolicyServiceError> {
    let tenant = require_admin(tenant)?;
    let usecase = SendReminderUseCase {
        users: state.user_repo(),
        policies: state.policy_repo(),
        assignments: state.assignment_repo(),
        notifier: state.notifier(),
        jwt_secret: state.jwt_secret.clone(),
        frontend_url: state.frontend_url.clone(),
    };
    usecase.execute(tenant, assignment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct BulkRemindResponse {
    pub sent: u32,
    pub failed: Vec<Uuid>,
    pub skipped_at_bound: u32,
}

pub async fn bulk_remind(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(policy_id): Path<Uuid>,
) -> Result<Json<BulkRemindResponse>, PolicyServiceError> {
    let tenant = require_admin(tenant)?;
    let usecase = BulkRemindUseCase {
        users: state.user_repo(),
        policies: state.policy_repo(),
        assignments: state.assignment_repo(),
        notifier: state.notifier(),
        jwt_secret: state.jwt_secret.clone(),
        frontend_url: state.frontend_url.clone(),
    };
    let outcome = usecase.execute(tenant, policy_id).await?;
    Ok(Json(BulkRemindResponse {
        sent: outcome.sent,
        failed: outcome.failed,
        skipped_at_bound: outcome.skipped_at_bound,
    }))
}

pub async fn delete_assignment(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(assignment_id): Path<Uuid>,
) -> Result<StatusCode, PolicyServiceError> {
    let tenant = require_admin(tenant)?;
    let usecase = DeleteAssignmentUseCase {
        policies: state.policy_repo(),
        assignments: state.assignment_repo(),
    };
    usecase.execute(tenant, assignment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
