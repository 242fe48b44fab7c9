use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use attest_policy::domain::repository::{
    AssignmentRepository, AuthChallengeRepository, Notifier, ObjectStore, PolicyRepository,
    UserRepository,
};
use attest_policy::domain::types::{
    AckRecord, Assignment, AssignmentStatus, AuthChallenge, LOGIN_CODE_TTL_MINS, MAX_REMINDERS,
    Policy, StaffUser, Tenant, UserRole,
};
use attest_policy::error::PolicyServiceError;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<StaffUser>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<StaffUser>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_email(
        &self,
        workspace_id: Uuid,
        email: &str,
    ) -> Result<Option<StaffUser>, PolicyServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.workspace_id == workspace_id && u.email == email)
            .cloned())
    }

    async fn find_by_email_any(
        &self,
        email: &str,
    ) -> Result<Option<StaffUser>, PolicyServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StaffUser>, PolicyServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create(
        &self,
        workspace_id: Uuid,
        email: &str,
        name: &str,
        role: UserRole,
    ) -> Result<StaffUser, PolicyServiceError> {
        let user = StaffUser {
            id: Uuid::new_v4(),
            workspace_id,
            email: email.to_owned(),
            name: name.to_owned(),
            role,
            department: None,
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }
}

// ── MockPolicyRepo ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockPolicyRepo {
    pub policies: Arc<Mutex<Vec<Policy>>>,
    pub ack_count: u64,
    pub assignment_count: u64,
}

impl MockPolicyRepo {
    pub fn new(policies: Vec<Policy>) -> Self {
        Self {
            policies: Arc::new(Mutex::new(policies)),
            ack_count: 0,
            assignment_count: 0,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Same backing store, different assignment/ack counts.
    pub fn with_counts(&self, ack_count: u64, assignment_count: u64) -> Self {
        Self {
            policies: Arc::clone(&self.policies),
            ack_count,
            assignment_count,
        }
    }
}

impl PolicyRepository for MockPolicyRepo {
    async fn find_by_id(
        &self,
        tenant: Tenant,
        id: Uuid,
    ) -> Result<Option<Policy>, PolicyServiceError> {
        Ok(self
            .policies
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id && p.workspace_id == tenant.workspace_id)
            .cloned())
    }

    async fn find_by_id_any(&self, id: Uuid) -> Result<Option<Policy>, PolicyServiceError> {
        Ok(self
            .policies
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn create(&self, policy: &Policy) -> Result<(), PolicyServiceError> {
        self.policies.lock().unwrap().push(policy.clone());
        Ok(())
    }

    async fn update(&self, policy: &Policy) -> Result<(), PolicyServiceError> {
        let mut policies = self.policies.lock().unwrap();
        if let Some(existing) = policies.iter_mut().find(|p| p.id == policy.id) {
            *existing = policy.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), PolicyServiceError> {
        self.policies.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn acknowledged_count(&self, _policy_id: Uuid) -> Result<u64, PolicyServiceError> {
        Ok(self.ack_count)
    }

    async fn assignment_count(&self, _policy_id: Uuid) -> Result<u64, PolicyServiceError> {
        Ok(self.assignment_count)
    }
}

// ── MockAssignmentRepo ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockAssignmentRepo {
    pub assignments: Arc<Mutex<Vec<Assignment>>>,
    pub acks: Arc<Mutex<Vec<AckRecord>>>,
    pub events: Arc<Mutex<Vec<(Uuid, String)>>>,
    pub fail_cache: bool,
}

impl MockAssignmentRepo {
    pub fn new(assignments: Vec<Assignment>) -> Self {
        Self {
            assignments: Arc::new(Mutex::new(assignments)),
            acks: Arc::new(Mutex::new(vec![])),
            events: Arc::new(Mutex::new(vec![])),
            fail_cache: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Same store, but `cache_magic_link` fails.
    pub fn failing_cache(assignments: Vec<Assignment>) -> Self {
        Self {
            fail_cache: true,
            ..Self::new(assignments)
        }
    }

    pub fn get(&self, id: Uuid) -> Assignment {
        self.assignments
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .expect("assignment not found in mock")
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, kind)| kind.clone())
            .collect()
    }
}

impl AssignmentRepository for MockAssignmentRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>, PolicyServiceError> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_for_policy_user(
        &self,
        policy_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Assignment>, PolicyServiceError> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.policy_id == policy_id && a.user_id == user_id)
            .cloned())
    }

    async fn list_for_policy(
        &self,
        policy_id: Uuid,
    ) -> Result<Vec<Assignment>, PolicyServiceError> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.policy_id == policy_id)
            .cloned()
            .collect())
    }

    async fn create(&self, assignment: &Assignment) -> Result<(), PolicyServiceError> {
        self.assignments.lock().unwrap().push(assignment.clone());
        Ok(())
    }

    async fn mark_viewed(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), PolicyServiceError> {
        let mut assignments = self.assignments.lock().unwrap();
        if let Some(a) = assignments.iter_mut().find(|a| a.id == id) {
            if a.status == AssignmentStatus::Pending {
                a.status = AssignmentStatus::Viewed;
                a.viewed_at = Some(at);
            }
        }
        Ok(())
    }

    async fn cache_magic_link(&self, id: Uuid, token: &str) -> Result<(), PolicyServiceError> {
        if self.fail_cache {
            return Err(anyhow::anyhow!("cache write failed").into());
        }
        let mut assignments = self.assignments.lock().unwrap();
        if let Some(a) = assignments.iter_mut().find(|a| a.id == id) {
            a.magic_link_token = Some(token.to_owned());
        }
        Ok(())
    }

    async fn try_increment_reminder(&self, id: Uuid) -> Result<bool, PolicyServiceError> {
        let mut assignments = self.assignments.lock().unwrap();
        if let Some(a) = assignments.iter_mut().find(|a| a.id == id) {
            if !a.status.is_terminal() && a.reminder_count < MAX_REMINDERS {
                a.reminder_count += 1;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn rollback_reminder(&self, id: Uuid) -> Result<(), PolicyServiceError> {
        let mut assignments = self.assignments.lock().unwrap();
        if let Some(a) = assignments.iter_mut().find(|a| a.id == id) {
            if a.reminder_count > 0 {
                a.reminder_count -= 1;
            }
        }
        Ok(())
    }

    async fn record_acknowledgment(
        &self,
        record: &AckRecord,
        at: DateTime<Utc>,
    ) -> Result<(), PolicyServiceError> {
        let mut acks = self.acks.lock().unwrap();
        if acks.iter().any(|a| a.assignment_id == record.assignment_id) {
            return Err(PolicyServiceError::IntegrityConflict);
        }
        acks.push(record.clone());

        let mut assignments = self.assignments.lock().unwrap();
        if let Some(a) = assignments.iter_mut().find(|a| a.id == record.assignment_id) {
            a.status = AssignmentStatus::Acknowledged;
            a.acknowledged_at = Some(at);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), PolicyServiceError> {
        self.assignments.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }

    async fn record_email_event(
        &self,
        assignment_id: Uuid,
        event_type: &str,
        _provider_message_id: Option<&str>,
    ) -> Result<(), PolicyServiceError> {
        self.events
            .lock()
            .unwrap()
            .push((assignment_id, event_type.to_owned()));
        Ok(())
    }
}

// ── MockChallengeRepo ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockChallengeRepo {
    pub challenges: Arc<Mutex<Vec<AuthChallenge>>>,
}

impl MockChallengeRepo {
    pub fn new(challenges: Vec<AuthChallenge>) -> Self {
        Self {
            challenges: Arc::new(Mutex::new(challenges)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn get(&self, id: Uuid) -> AuthChallenge {
        self.challenges
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .expect("challenge not found in mock")
    }
}

impl AuthChallengeRepository for MockChallengeRepo {
    async fn replace_for_email(
        &self,
        challenge: &AuthChallenge,
    ) -> Result<(), PolicyServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        challenges.retain(|c| c.email != challenge.email);
        challenges.push(challenge.clone());
        Ok(())
    }

    async fn find_live_by_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthChallenge>, PolicyServiceError> {
        Ok(self
            .challenges
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.email == email && c.expires_at > now)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn find_live_by_magic_id(
        &self,
        magic_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthChallenge>, PolicyServiceError> {
        Ok(self
            .challenges
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.magic_id == magic_id && c.expires_at > now)
            .cloned())
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<(), PolicyServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        if let Some(c) = challenges.iter_mut().find(|c| c.id == id) {
            c.attempts += 1;
        }
        Ok(())
    }

    async fn mark_used(&self, id: Uuid) -> Result<(), PolicyServiceError> {
        let mut challenges = self.challenges.lock().unwrap();
        if let Some(c) = challenges.iter_mut().find(|c| c.id == id) {
            c.used = true;
        }
        Ok(())
    }
}

// ── MockNotifier ─────────────────────────────────────────────────────────────

/// Records every send as `(kind, recipient)`. Recipients listed in
/// `fail_for` get `NotificationFailed` instead.
#[derive(Clone)]
pub struct MockNotifier {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub fail_for: Vec<String>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail_for: vec![],
        }
    }

    pub fn failing_for(emails: Vec<&str>) -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail_for: emails.into_iter().map(str::to_owned).collect(),
        }
    }

    fn record(&self, kind: &str, to: &str) -> Result<String, PolicyServiceError> {
        if self.fail_for.iter().any(|e| e == to) {
            return Err(PolicyServiceError::NotificationFailed);
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((kind.to_owned(), to.to_owned()));
        Ok(format!("msg-{}", sent.len()))
    }

    pub fn sent_kinds(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(kind, _)| kind.clone())
            .collect()
    }
}

impl Notifier for MockNotifier {
    async fn send_login_code(
        &self,
        email: &str,
        _code: &str,
        _magic_id: &str,
    ) -> Result<String, PolicyServiceError> {
        self.record("login_code", email)
    }

    async fn send_assignment_email(
        &self,
        email: &str,
        _policy_title: &str,
        _ack_url: &str,
    ) -> Result<String, PolicyServiceError> {
        self.record("assignment", email)
    }

    async fn send_reminder(
        &self,
        email: &str,
        _policy_title: &str,
        _ack_url: &str,
        _reminder_number: i32,
    ) -> Result<String, PolicyServiceError> {
        self.record("reminder", email)
    }

    async fn send_ack_confirmation(
        &self,
        email: &str,
        _policy_title: &str,
    ) -> Result<String, PolicyServiceError> {
        self.record("confirmation", email)
    }
}

// ── MockObjectStore ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockObjectStore {
    pub objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockObjectStore {
    pub fn empty() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_object(key: &str, bytes: &[u8]) -> Self {
        let store = Self::empty();
        store
            .objects
            .lock()
            .unwrap()
            .insert(key.to_owned(), bytes.to_vec());
        store
    }
}

impl ObjectStore for MockObjectStore {
    async fn download(&self, key: &str) -> Result<Vec<u8>, PolicyServiceError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("object not found: {key}").into())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_tenant(workspace_id: Uuid) -> Tenant {
    Tenant {
        user_id: Uuid::new_v4(),
        workspace_id,
        role: UserRole::Admin,
    }
}

pub fn test_user(workspace_id: Uuid, email: &str) -> StaffUser {
    StaffUser {
        id: Uuid::new_v4(),
        workspace_id,
        email: email.to_owned(),
        name: "Test User".to_owned(),
        role: UserRole::Employee,
        department: None,
        created_at: Utc::now(),
    }
}

pub fn test_policy(workspace_id: Uuid) -> Policy {
    Policy {
        id: Uuid::new_v4(),
        workspace_id,
        title: "Acceptable Use Policy".to_owned(),
        body_markdown: Some("# Rules\nBe sensible.".to_owned()),
        file_key: None,
        content_sha256: "a".repeat(64),
        version: 1,
        due_at: None,
        require_typed_signature: false,
        created_by: Uuid::new_v4(),
        created_at: Utc::now(),
    }
}

pub fn test_assignment(policy_id: Uuid, user_id: Uuid) -> Assignment {
    Assignment {
        id: Uuid::new_v4(),
        policy_id,
        user_id,
        status: AssignmentStatus::Pending,
        viewed_at: None,
        acknowledged_at: None,
        reminder_count: 0,
        magic_link_token: None,
        created_at: Utc::now(),
    }
}

pub fn live_challenge(email: &str, code: &str) -> AuthChallenge {
    AuthChallenge {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        code: code.to_owned(),
        magic_id: "MAGICMAGICMAGICMAGICMAGICMAGICID".to_owned(),
        expires_at: Utc::now() + Duration::minutes(LOGIN_CODE_TTL_MINS),
        used: false,
        attempts: 0,
        created_at: Utc::now(),
    }
}
