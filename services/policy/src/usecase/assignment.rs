use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{AssignmentRepository, Notifier, PolicyRepository, UserRepository};
use crate::domain::types::{Assignment, AssignmentStatus, Tenant, UserRole};
use crate::error::PolicyServiceError;

/// Return the assignment's magic-link token, minting and caching one on
/// first use. Reusing the cached token keeps every email for an assignment
/// pointing at the same URL.
pub(crate) async fn obtain_magic_link<A: AssignmentRepository>(
    assignments: &A,
    assignment: &Assignment,
    recipient_email: &str,
    jwt_secret: &str,
) -> Result<String, PolicyServiceError> {
    if let Some(token) = &assignment.magic_link_token {
        return Ok(token.clone());
    }
    let token = attest_token::sign_magic_link_token(assignment.id, recipient_email, jwt_secret)
        .map_err(|e| PolicyServiceError::Internal(anyhow::Error::new(e)))?;
    assignments.cache_magic_link(assignment.id, &token).await?;
    Ok(token)
}

pub(crate) fn ack_url(frontend_url: &str, token: &str) -> String {
    format!("{}/ack/{}", frontend_url.trim_end_matches('/'), token)
}

pub struct AddRecipientsInput {
    pub tenant: Tenant,
    pub policy_id: Uuid,
    pub emails: Vec<String>,
}

pub struct AddRecipientsOutcome {
    pub added: Vec<Uuid>,
    pub duplicates: Vec<String>,
}

pub struct AddRecipientsUseCase<U, P, A>
where
    U: UserRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
{
    pub users: U,
    pub policies: P,
    pub assignments: A,
}

impl<U, P, A> AddRecipientsUseCase<U, P, A>
where
    U: UserRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
{
    pub async fn execute(
        &self,
        input: AddRecipientsInput,
    ) -> Result<AddRecipientsOutcome, PolicyServiceError> {
        let policy = self
            .policies
            .find_by_id(input.tenant, input.policy_id)
            .await?
            .ok_or(PolicyServiceError::PolicyNotFound)?;

        let mut added = Vec::new();
        let mut duplicates = Vec::new();

        for raw in input.emails {
            let email = raw.trim().to_lowercase();
            if email.is_empty() {
                continue;
            }

            // Unknown recipients become employee users on the fly; the
            // email prefix stands in for a display name until they log in
            let user = match self
                .users
                .find_by_email(input.tenant.workspace_id, &email)
                .await?
            {
                Some(user) => user,
                None => {
                    let name = email.split('@').next().unwrap_or(&email).to_owned();
                    self.users
                        .create(input.tenant.workspace_id, &email, &name, UserRole::Employee)
                        .await?
                }
            };

            if self
                .assignments
                .find_for_policy_user(policy.id, user.id)
                .await?
                .is_some()
            {
                duplicates.push(email);
                continue;
            }

            let assignment = Assignment {
                id: Uuid::new_v4(),
                policy_id: policy.id,
                user_id: user.id,
                status: AssignmentStatus::Pending,
                viewed_at: None,
                acknowledged_at: None,
                reminder_count: 0,
                magic_link_token: None,
                created_at: Utc::now(),
            };
            self.assignments.create(&assignment).await?;
            added.push(assignment.id);
        }

        Ok(AddRecipientsOutcome { added, duplicates })
    }
}

pub struct SendAssignmentEmailsOutcome {
    pub sent: u32,
    pub failed: Vec<String>,
}

pub struct SendAssignmentEmailsUseCase<U, P, A, N>
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
    pub frontend_url: String,
}

impl<U, P, A, N> SendAssignmentEmailsUseCase<U, P, A, N>
where
    U: UserRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
    N: Notifier,
{
    /// Email every open assignment under a policy. Per-recipient failures
    /// are collected rather than aborting the batch.
    pub async fn execute(
        &self,
        tenant: Tenant,
        policy_id: Uuid,
    ) -> Result<SendAssignmentEmailsOutcome, PolicyServiceError> {
        let policy = self
            .policies
            .find_by_id(tenant, policy_id)
            .await?
            .ok_or(PolicyServiceError::PolicyNotFound)?;

        let mut sent = 0;
        let mut failed = Vec::new();

        for assignment in self.assignments.list_for_policy(policy.id).await? {
            if assignment.status.is_terminal() {
                continue;
            }
            let Some(user) = self.users.find_by_id(assignment.user_id).await? else {
                failed.push(assignment.user_id.to_string());
                continue;
            };

            let token = obtain_magic_link(
                &self.assignments,
                &assignment,
                &user.email,
                &self.jwt_secret,
            )
            .await?;
            let url = ack_url(&self.frontend_url, &token);

            match self
                .notifier
                .send_assignment_email(&user.email, &policy.title, &url)
                .await
            {
                Ok(message_id) => {
                    self.assignments
                        .record_email_event(assignment.id, "assignment_sent", Some(&message_id))
                        .await?;
                    sent += 1;
                }
                Err(e) => {
                    tracing::warn!(email = %user.email, error = %e, "assignment email failed");
                    failed.push(user.email);
                }
            }
        }

        Ok(SendAssignmentEmailsOutcome { sent, failed })
    }
}

pub struct DeleteAssignmentUseCase<P, A>
where
    P: PolicyRepository,
    A: AssignmentRepository,
{
    pub policies: P,
    pub assignments: A,
}

impl<P, A> DeleteAssignmentUseCase<P, A>
where
    P: PolicyRepository,
    A: AssignmentRepository,
{
    pub async fn execute(
        &self,
        tenant: Tenant,
        assignment_id: Uuid,
    ) -> Result<(), PolicyServiceError> {
        let assignment = self
            .assignments
            .find_by_id(assignment_id)
            .await?
            .ok_or(PolicyServiceError::AssignmentNotFound)?;

        // Cross-workspace ids look exactly like missing ones
        self.policies
            .find_by_id(tenant, assignment.policy_id)
            .await?
            .ok_or(PolicyServiceError::AssignmentNotFound)?;

        if assignment.status == AssignmentStatus::Acknowledged {
            return Err(PolicyServiceError::AlreadyAcknowledged);
        }
        self.assignments.delete(assignment.id).await
    }
}
