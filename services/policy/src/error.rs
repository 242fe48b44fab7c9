use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Policy service domain error variants.
///
/// Every variant below `Internal` is an expected, recoverable-by-the-caller
/// outcome and maps to a distinct status + kind; only `Internal` is logged.
#[derive(Debug, thiserror::Error)]
pub enum PolicyServiceError {
    #[error("credential expired")]
    ExpiredCredential,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("wrong token kind")]
    WrongTokenKind,
    #[error("maximum verification attempts exceeded")]
    AttemptsExceeded,
    #[error("credential already used")]
    AlreadyUsed,
    #[error("identity does not match")]
    IdentityMismatch,
    #[error("already acknowledged")]
    AlreadyAcknowledged,
    #[error("assignment is closed")]
    AssignmentClosed,
    #[error("typed signature required")]
    MissingRequiredSignature,
    #[error("maximum reminders already sent")]
    ReminderBoundExceeded,
    #[error("conflicting concurrent write")]
    IntegrityConflict,
    #[error("policy content is locked by existing acknowledgments")]
    ContentLocked,
    #[error("policy still has assignments")]
    PolicyInUse,
    #[error("policy needs a body or an attachment")]
    MissingContent,
    #[error("notification delivery failed")]
    NotificationFailed,
    #[error("user not found")]
    UserNotFound,
    #[error("policy not found")]
    PolicyNotFound,
    #[error("assignment not found")]
    AssignmentNotFound,
    #[error("admin access required")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PolicyServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExpiredCredential => "EXPIRED_CREDENTIAL",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::WrongTokenKind => "WRONG_TOKEN_KIND",
            Self::AttemptsExceeded => "ATTEMPTS_EXCEEDED",
            Self::AlreadyUsed => "ALREADY_USED",
            Self::IdentityMismatch => "IDENTITY_MISMATCH",
            Self::AlreadyAcknowledged => "ALREADY_ACKNOWLEDGED",
            Self::AssignmentClosed => "ASSIGNMENT_CLOSED",
            Self::MissingRequiredSignature => "MISSING_REQUIRED_SIGNATURE",
            Self::ReminderBoundExceeded => "REMINDER_BOUND_EXCEEDED",
            Self::IntegrityConflict => "INTEGRITY_CONFLICT",
            Self::ContentLocked => "CONTENT_LOCKED",
            Self::PolicyInUse => "POLICY_IN_USE",
            Self::MissingContent => "MISSING_CONTENT",
            Self::NotificationFailed => "NOTIFICATION_FAILED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::PolicyNotFound => "POLICY_NOT_FOUND",
            Self::AssignmentNotFound => "ASSIGNMENT_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<attest_token::TokenError> for PolicyServiceError {
    fn from(err: attest_token::TokenError) -> Self {
        match err {
            attest_token::TokenError::Expired => Self::ExpiredCredential,
            attest_token::TokenError::WrongKind => Self::WrongTokenKind,
            attest_token::TokenError::InvalidSignature | attest_token::TokenError::Malformed => {
                Self::InvalidCredential
            }
        }
    }
}

impl IntoResponse for PolicyServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ExpiredCredential | Self::InvalidCredential | Self::WrongTokenKind => {
                StatusCode::UNAUTHORIZED
            }
            Self::IdentityMismatch | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AlreadyUsed
            | Self::AlreadyAcknowledged
            | Self::AssignmentClosed
            | Self::IntegrityConflict
            | Self::ContentLocked
            | Self::PolicyInUse => StatusCode::CONFLICT,
            Self::AttemptsExceeded | Self::ReminderBoundExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::MissingRequiredSignature | Self::MissingContent => StatusCode::BAD_REQUEST,
            Self::NotificationFailed => StatusCode::BAD_GATEWAY,
            Self::UserNotFound | Self::PolicyNotFound | Self::AssignmentNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
