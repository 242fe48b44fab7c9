use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{AssignmentRepository, Notifier, PolicyRepository, UserRepository};
use crate::domain::types::{
    AckMethod, AckRecord, Assignment, AssignmentStatus, ClientContext, Policy, StaffUser,
};
use crate::error::PolicyServiceError;

/// Everything the acknowledgment page needs to render.
pub struct AckPageData {
    pub policy: Policy,
    pub recipient: StaffUser,
    pub status: AssignmentStatus,
    /// Due date passed. Informational; acknowledging stays possible.
    pub is_expired: bool,
    pub already_acknowledged: bool,
}

/// Resolve a magic-link token to its assignment, recipient, and policy,
/// enforcing that the token was issued for this recipient.
async fn resolve_token<U, P, A>(
    users: &U,
    policies: &P,
    assignments: &A,
    token: &str,
    jwt_secret: &str,
) -> Result<(Assignment, StaffUser, Policy), PolicyServiceError>
where
    U: UserRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
{
    let claims = attest_token::verify_magic_link_token(token, jwt_secret)?;
    let assignment_id = Uuid::parse_str(&claims.assignment_id)
        .map_err(|_| PolicyServiceError::InvalidCredential)?;

    let assignment = assignments
        .find_by_id(assignment_id)
        .await?
        .ok_or(PolicyServiceError::AssignmentNotFound)?;
    let user = users
        .find_by_id(assignment.user_id)
        .await?
        .ok_or(PolicyServiceError::UserNotFound)?;

    // The token names its recipient; a forwarded link stops here
    if !claims.user_email.eq_ignore_ascii_case(&user.email) {
        return Err(PolicyServiceError::IdentityMismatch);
    }

    let policy = policies
        .find_by_id_any(assignment.policy_id)
        .await?
        .ok_or(PolicyServiceError::PolicyNotFound)?;

    Ok((assignment, user, policy))
}

pub struct ViewAssignmentUseCase<U, P, A>
where
    U: UserRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
{
    pub users: U,
    pub policies: P,
    pub assignments: A,
    pub jwt_secret: String,
}

impl<U, P, A> ViewAssignmentUseCase<U, P, A>
where
    U: UserRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
{
    /// First open marks the assignment viewed; every later open (and any
    /// terminal state) is a no-op on status.
    pub async fn execute(&self, token: &str) -> Result<AckPageData, PolicyServiceError> {
        let (assignment, user, policy) = resolve_token(
            &self.users,
            &self.policies,
            &self.assignments,
            token,
            &self.jwt_secret,
        )
        .await?;

        let now = Utc::now();
        let status = if assignment.status == AssignmentStatus::Pending {
            self.assignments.mark_viewed(assignment.id, now).await?;
            AssignmentStatus::Viewed
        } else {
            assignment.status
        };

        Ok(AckPageData {
            is_expired: policy.is_expired(now),
            already_acknowledged: status == AssignmentStatus::Acknowledged,
            policy,
            recipient: user,
            status,
        })
    }
}

pub struct AcknowledgeInput {
    pub token: String,
    pub signer_name: String,
    pub signer_email: String,
    pub typed_signature: Option<String>,
    pub client: ClientContext,
}

pub struct AcknowledgeUseCase<U, P, A, N>
where
    U: UserRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
    N: Notifier,
{
    pub users: U,
    pub policies: P,
    pub assignments: A,
    pub notifier: N,
    pub jwt_secret: String,
}

impl<U, P, A, N> AcknowledgeUseCase<U, P, A, N>
where
    U: UserRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
    N: Notifier,
{
    pub async fn execute(&self, input: AcknowledgeInput) -> Result<AckRecord, PolicyServiceError> {
        // Guards 1-2: token signature/kind/expiry, token email = recipient
        let (assignment, user, policy) = resolve_token(
            &self.users,
            &self.policies,
            &self.assignments,
            &input.token,
            &self.jwt_secret,
        )
        .await?;

        // Guard 3: the signer must be the recipient, not a forwardee
        if !input.signer_email.eq_ignore_ascii_case(&user.email) {
            return Err(PolicyServiceError::IdentityMismatch);
        }

        // Guard 4: typed signature when the policy demands one
        let typed_signature = input
            .typed_signature
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        if policy.require_typed_signature && typed_signature.is_none() {
            return Err(PolicyServiceError::MissingRequiredSignature);
        }

        // Guard 5: terminal states never reopen
        match assignment.status {
            AssignmentStatus::Acknowledged => return Err(PolicyServiceError::AlreadyAcknowledged),
            AssignmentStatus::Declined => return Err(PolicyServiceError::AssignmentClosed),
            AssignmentStatus::Pending | AssignmentStatus::Viewed => {}
        }

        let now = Utc::now();
        let method = if typed_signature.is_some() {
            AckMethod::Typed
        } else {
            AckMethod::OneClick
        };
        let record = AckRecord {
            id: Uuid::new_v4(),
            assignment_id: assignment.id,
            signer_name: input.signer_name.trim().to_owned(),
            signer_email: user.email.clone(),
            typed_signature,
            ip_address: input.client.ip_address,
            user_agent: input.client.user_agent,
            // Pin what was acknowledged, content-wise, at this instant
            policy_version: policy.version,
            policy_hash_at_ack: policy.content_sha256.clone(),
            method,
            created_at: now,
        };

        // The unique index on assignment_id breaks ties between concurrent
        // submissions; the loser reads as a duplicate, not a server error
        match self.assignments.record_acknowledgment(&record, now).await {
            Err(PolicyServiceError::IntegrityConflict) => {
                return Err(PolicyServiceError::AlreadyAcknowledged);
            }
            other => other?,
        }

        // Confirmation email is best-effort; the acknowledgment stands
        match self
            .notifier
            .send_ack_confirmation(&user.email, &policy.title)
            .await
        {
            Ok(message_id) => {
                if let Err(e) = self
                    .assignments
                    .record_email_event(assignment.id, "ack_confirmation_sent", Some(&message_id))
                    .await
                {
                    tracing::warn!(assignment_id = %assignment.id, error = %e, "email event write failed");
                }
            }
            Err(e) => {
                tracing::warn!(assignment_id = %assignment.id, error = %e, "confirmation email failed");
            }
        }

        Ok(record)
    }
}
