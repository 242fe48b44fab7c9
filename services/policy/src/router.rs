use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use attest_core::health::{healthz, readyz};
use attest_core::middleware::request_id_layer;

use crate::handlers::{
    acknowledgments::{acknowledge, view_assignment},
    assignments::{
        add_recipients, bulk_remind, delete_assignment, send_assignment_emails, send_reminder,
    },
    auth::{send_login_code, verify_login_code, verify_login_link},
    policies::{create_policy, delete_policy, update_policy},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Login
        .route("/auth/send-code", post(send_login_code))
        .route("/auth/verify-code", post(verify_login_code))
        .route("/auth/verify-link", post(verify_login_link))
        // Policies (admin)
        .route("/policies", post(create_policy))
        .route("/policies/{policy_id}", patch(update_policy))
        .route("/policies/{policy_id}", delete(delete_policy))
        // Assignments (admin)
        .route("/policies/{policy_id}/recipients", post(add_recipients))
        .route("/policies/{policy_id}/send", post(send_assignment_emails))
        .route("/policies/{policy_id}/remind-all", post(bulk_remind))
        .route("/assignments/{assignment_id}/remind", post(send_reminder))
        .route("/assignments/{assignment_id}", delete(delete_assignment))
        // Acknowledgment page (magic-link authenticated)
        .route("/ack/{token}", get(view_assignment))
        .route("/ack/{token}", post(acknowledge))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
