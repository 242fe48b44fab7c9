use uuid::Uuid;

use crate::domain::repository::{AssignmentRepository, Notifier, PolicyRepository, UserRepository};
use crate::domain::types::{Assignment, MAX_REMINDERS, Policy, Tenant};
use crate::error::PolicyServiceError;
use crate::usecase::assignment::{ack_url, obtain_magic_link};

/// Increment-then-send for one assignment.
///
/// The counter moves first, atomically and guarded, so two concurrent
/// reminders can never both pass the bound. A delivery failure rolls the
/// increment back for exactly this assignment and surfaces the error.
async fn remind_one<U, A, N>(
    users: &U,
    assignments: &A,
    notifier: &N,
    jwt_secret: &str,
    frontend_url: &str,
    policy: &Policy,
    assignment: &Assignment,
) -> Result<(), PolicyServiceError>
where
    U: UserRepository,
    A: AssignmentRepository,
    N: Notifier,
{
    let user = users
        .find_by_id(assignment.user_id)
        .await?
        .ok_or(PolicyServiceError::UserNotFound)?;

    if !assignments.try_increment_reminder(assignment.id).await? {
        return Err(PolicyServiceError::ReminderBoundExceeded);
    }

    // Anything that fails before the email goes out undoes the increment;
    // the counter only ever counts delivered reminders
    let token = match obtain_magic_link(assignments, assignment, &user.email, jwt_secret).await {
        Ok(token) => token,
        Err(e) => {
            assignments.rollback_reminder(assignment.id).await?;
            return Err(e);
        }
    };
    let url = ack_url(frontend_url, &token);

    match notifier
        .send_reminder(&user.email, &policy.title, &url, assignment.reminder_count + 1)
        .await
    {
        Ok(message_id) => {
            // The reminder was delivered; a failed event write must not
            // surface as a send failure or touch the counter
            if let Err(e) = assignments
                .record_email_event(assignment.id, "reminder_sent", Some(&message_id))
                .await
            {
                tracing::warn!(assignment_id = %assignment.id, error = %e, "email event write failed");
            }
            Ok(())
        }
        Err(e) => {
            assignments.rollback_reminder(assignment.id).await?;
            Err(e)
        }
    }
}

pub struct SendReminderUseCase<U, P, A, N>
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

impl<U, P, A, N> SendReminderUseCase<U, P, A, N>
where
    U: UserRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
    N: Notifier,
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

        let policy = self
            .policies
            .find_by_id(tenant, assignment.policy_id)
            .await?
            .ok_or(PolicyServiceError::AssignmentNotFound)?;

        if assignment.status.is_terminal() {
            return Err(PolicyServiceError::AssignmentClosed);
        }
        // Fast path; the guarded increment below is the authoritative check
        if assignment.reminder_count >= MAX_REMINDERS {
            return Err(PolicyServiceError::ReminderBoundExceeded);
        }

        remind_one(
            &self.users,
            &self.assignments,
            &self.notifier,
            &self.jwt_secret,
            &self.frontend_url,
            &policy,
            &assignment,
        )
        .await
    }
}

pub struct BulkRemindOutcome {
    pub sent: u32,
    pub failed: Vec<Uuid>,
    pub skipped_at_bound: u32,
}

pub struct BulkRemindUseCase<U, P, A, N>
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

impl<U, P, A, N> BulkRemindUseCase<U, P, A, N>
where
    U: UserRepository,
    P: PolicyRepository,
    A: AssignmentRepository,
    N: Notifier,
{
    /// Remind every eligible open assignment under a policy. Items are
    /// independent: one failure neither aborts the batch nor touches any
    /// other assignment's counter.
    pub async fn execute(
        &self,
        tenant: Tenant,
        policy_id: Uuid,
    ) -> Result<BulkRemindOutcome, PolicyServiceError> {
        let policy = self
            .policies
            .find_by_id(tenant, policy_id)
            .await?
            .ok_or(PolicyServiceError::PolicyNotFound)?;

        let mut sent = 0;
        let mut failed = Vec::new();
        let mut skipped_at_bound = 0;

        for assignment in self.assignments.list_for_policy(policy.id).await? {
            if assignment.status.is_terminal() {
                continue;
            }
            if assignment.reminder_count >= MAX_REMINDERS {
                skipped_at_bound += 1;
                continue;
            }

            match remind_one(
                &self.users,
                &self.assignments,
                &self.notifier,
                &self.jwt_secret,
                &self.frontend_url,
                &policy,
                &assignment,
            )
            .await
            {
                Ok(()) => sent += 1,
                Err(PolicyServiceError::ReminderBoundExceeded) => skipped_at_bound += 1,
                Err(e) => {
                    tracing::warn!(assignment_id = %assignment.id, error = %e, "reminder failed");
                    failed.push(assignment.id);
                }
            }
        }

        Ok(BulkRemindOutcome {
            sent,
            failed,
            skipped_at_bound,
        })
    }
}
