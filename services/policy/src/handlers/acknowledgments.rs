use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::ClientContext;
use crate::error::PolicyServiceError;
use crate::state::AppState;
use crate::usecase::acknowledgment::{
    AcknowledgeInput, AcknowledgeUseCase, ViewAssignmentUseCase,
};

/// Best-effort client IP: first `x-forwarded-for` entry, then `x-forwarded`,
/// then `x-real-ip`, then the connection peer. Proxy headers win because the
/// peer is usually the load balancer.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_owned();
            }
        }
    }
    for name in ["x-forwarded", "x-real-ip"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_owned();
            }
        }
    }
    peer.ip().to_string()
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

#[derive(Serialize)]
pub struct AckPageResponse {
    pub policy_title: String,
    pub policy_body: Option<String>,
    pub policy_file_key: Option<String>,
    pub policy_version: i32,
    pub require_typed_signature: bool,
    pub recipient_name: String,
    pub recipient_email: String,
    pub status: &'static str,
    pub is_expired: bool,
    pub already_acknowledged: bool,
}

pub async fn view_assignment(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<AckPageResponse>, PolicyServiceError> {
    let usecase = ViewAssignmentUseCase {
        users: state.user_repo(),
        policies: state.policy_repo(),
        assignments: state.assignment_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let page = usecase.execute(&token).await?;
    Ok(Json(AckPageResponse {
        policy_title: page.policy.title,
        policy_body: page.policy.body_markdown,
        policy_file_key: page.policy.file_key,
        policy_version: page.policy.version,
        require_typed_signature: page.policy.require_typed_signature,
        recipient_name: page.recipient.name,
        recipient_email: page.recipient.email,
        status: page.status.as_str(),
        is_expired: page.is_expired,
        already_acknowledged: page.already_acknowledged,
    }))
}

#[derive(Deserialize)]
pub struct AcknowledgeRequest {
    pub signer_name: String,
    pub signer_email: String,
    pub typed_signature: Option<String>,
}

#[derive(Serialize)]
pub struct AcknowledgeResponse {
    pub id: Uuid,
    pub method: &'static str,
    pub policy_version: i32,
    #[serde(serialize_with = "attest_core::serde::to_rfc3339_ms")]
    pub acknowledged_at: DateTime<Utc>,
}

pub async fn acknowledge(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(token): Path<String>,
    headers: HeaderMap,
    Json(body): Json<AcknowledgeRequest>,
) -> Result<(StatusCode, Json<AcknowledgeResponse>), PolicyServiceError> {
    let client = ClientContext {
        ip_address: Some(client_ip(&headers, peer)),
        user_agent: user_agent(&headers),
    };
    let usecase = AcknowledgeUseCase {
        users: state.user_repo(),
        policies: state.policy_repo(),
        assignments: state.assignment_repo(),
        notifier: state.notifier(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let record = usecase
        .execute(AcknowledgeInput {
            token,
            signer_name: body.signer_name,
            signer_email: body.signer_email,
            typed_signature: body.typed_signature,
            client,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AcknowledgeResponse {
            id: record.id,
            method: record.method.as_str(),
            policy_version: record.policy_version,
            acknowledged_at: record.created_at,
        }),
    ))
}
