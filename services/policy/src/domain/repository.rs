#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    AckRecord, Assignment, AuthChallenge, Policy, StaffUser, Tenant, UserRole,
};
use crate::error::PolicyServiceError;

/// Repository for workspace staff.
pub trait UserRepository: Send + Sync {
    async fn find_by_email(
        &self,
        workspace_id: Uuid,
        email: &str,
    ) -> Result<Option<StaffUser>, PolicyServiceError>;

    /// Lookup by email alone, for login where no workspace context exists
    /// yet. Emails are globally unique across workspaces in practice.
    async fn find_by_email_any(
        &self,
        email: &str,
    ) -> Result<Option<StaffUser>, PolicyServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StaffUser>, PolicyServiceError>;

    async fn create(
        &self,
        workspace_id: Uuid,
        email: &str,
        name: &str,
        role: UserRole,
    ) -> Result<StaffUser, PolicyServiceError>;
}

/// Repository for policy documents. Lookups are tenant-scoped: a policy in
/// another workspace behaves exactly like a missing one.
pub trait PolicyRepository: Send + Sync {
    async fn find_by_id(
        &self,
        tenant: Tenant,
        id: Uuid,
    ) -> Result<Option<Policy>, PolicyServiceError>;

    /// Lookup without a tenant predicate, for magic-link flows where the
    /// signed token itself is the authorization.
    async fn find_by_id_any(&self, id: Uuid) -> Result<Option<Policy>, PolicyServiceError>;

    async fn create(&self, policy: &Policy) -> Result<(), PolicyServiceError>;

    async fn update(&self, policy: &Policy) -> Result<(), PolicyServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), PolicyServiceError>;

    /// Count of assignments under this policy already in `acknowledged`.
    async fn acknowledged_count(&self, policy_id: Uuid) -> Result<u64, PolicyServiceError>;

    /// Total assignments under this policy.
    async fn assignment_count(&self, policy_id: Uuid) -> Result<u64, PolicyServiceError>;
}

/// Repository for policy assignments and their acknowledgment records.
pub trait AssignmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>, PolicyServiceError>;

    async fn find_for_policy_user(
        &self,
        policy_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Assignment>, PolicyServiceError>;

    /// All assignments under a policy, for sends and bulk reminders.
    async fn list_for_policy(
        &self,
        policy_id: Uuid,
    ) -> Result<Vec<Assignment>, PolicyServiceError>;

    async fn create(&self, assignment: &Assignment) -> Result<(), PolicyServiceError>;

    /// Pending -> Viewed, stamping `viewed_at`. No-op for any other status.
    async fn mark_viewed(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), PolicyServiceError>;

    /// Cache the issued magic-link token so later emails reuse it.
    async fn cache_magic_link(&self, id: Uuid, token: &str) -> Result<(), PolicyServiceError>;

    /// Atomically bump `reminder_count` if the assignment is still open and
    /// under the reminder bound. Returns `false` when the guarded update
    /// matched no row.
    async fn try_increment_reminder(&self, id: Uuid) -> Result<bool, PolicyServiceError>;

    /// Undo one reminder increment after a failed send.
    async fn rollback_reminder(&self, id: Uuid) -> Result<(), PolicyServiceError>;

    /// Insert the acknowledgment record and flip the assignment to
    /// `acknowledged` in one transaction. A concurrent duplicate surfaces as
    /// `IntegrityConflict` via the unique index on `assignment_id`.
    async fn record_acknowledgment(
        &self,
        record: &AckRecord,
        at: DateTime<Utc>,
    ) -> Result<(), PolicyServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), PolicyServiceError>;

    async fn record_email_event(
        &self,
        assignment_id: Uuid,
        event_type: &str,
        provider_message_id: Option<&str>,
    ) -> Result<(), PolicyServiceError>;
}

/// Repository for login challenges.
pub trait AuthChallengeRepository: Send + Sync {
    /// Delete any prior challenges for this email and insert the new one,
    /// in one transaction. At most one challenge is live per email.
    async fn replace_for_email(&self, challenge: &AuthChallenge)
    -> Result<(), PolicyServiceError>;

    /// Latest unexpired challenge for an email. Used/attempt state is left
    /// for the caller so it can distinguish `AlreadyUsed` from a bad code.
    async fn find_live_by_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthChallenge>, PolicyServiceError>;

    /// Unexpired challenge by magic-link identifier.
    async fn find_live_by_magic_id(
        &self,
        magic_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthChallenge>, PolicyServiceError>;

    async fn increment_attempts(&self, id: Uuid) -> Result<(), PolicyServiceError>;

    async fn mark_used(&self, id: Uuid) -> Result<(), PolicyServiceError>;
}

/// Port for the outbound email provider. Each send returns the provider's
/// message id for the email-event audit trail.
pub trait Notifier: Send + Sync {
    async fn send_login_code(
        &self,
        email: &str,
        code: &str,
        magic_id: &str,
    ) -> Result<String, PolicyServiceError>;

    async fn send_assignment_email(
        &self,
        email: &str,
        policy_title: &str,
        ack_url: &str,
    ) -> Result<String, PolicyServiceError>;

    async fn send_reminder(
        &self,
        email: &str,
        policy_title: &str,
        ack_url: &str,
        reminder_number: i32,
    ) -> Result<String, PolicyServiceError>;

    async fn send_ack_confirmation(
        &self,
        email: &str,
        policy_title: &str,
    ) -> Result<String, PolicyServiceError>;
}

/// Port for the attachment object store.
pub trait ObjectStore: Send + Sync {
    async fn download(&self, key: &str) -> Result<Vec<u8>, PolicyServiceError>;
}
