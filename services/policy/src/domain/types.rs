use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Login-challenge time-to-live.
pub const LOGIN_CODE_TTL_MINS: i64 = 10;

/// Maximum verification attempts per login challenge.
pub const MAX_CODE_ATTEMPTS: i32 = 3;

/// Maximum reminder emails per assignment.
pub const MAX_REMINDERS: i32 = 3;

/// Length of the login magic-link identifier.
pub const LOGIN_MAGIC_ID_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Employee,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }
}

/// Staff member inside one workspace.
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Policy document. Content (title, body, attachment) is fingerprinted;
/// edits bump `version` and recompute `content_sha256`.
#[derive(Debug, Clone)]
pub struct Policy {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    pub body_markdown: Option<String>,
    pub file_key: Option<String>,
    pub content_sha256: String,
    pub version: i32,
    pub due_at: Option<DateTime<Utc>>,
    pub require_typed_signature: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Policy {
    /// Due date passed. Informational only — never blocks acknowledgment.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.due_at.is_some_and(|due| now > due)
    }
}

/// Assignment lifecycle. `Acknowledged` and `Declined` are terminal: no
/// transition ever leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentStatus {
    Pending,
    Viewed,
    Acknowledged,
    Declined,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Viewed => "viewed",
            Self::Acknowledged => "acknowledged",
            Self::Declined => "declined",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "viewed" => Some(Self::Viewed),
            "acknowledged" => Some(Self::Acknowledged),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Acknowledged | Self::Declined)
    }

    /// Acknowledging is only legal from an open (non-terminal) state.
    pub fn can_acknowledge(&self) -> bool {
        !self.is_terminal()
    }
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub user_id: Uuid,
    pub status: AssignmentStatus,
    pub viewed_at: Option<DateTime<Utc>>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub reminder_count: i32,
    pub magic_link_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMethod {
    Typed,
    OneClick,
}

impl AckMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Typed => "typed",
            Self::OneClick => "oneclick",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "typed" => Some(Self::Typed),
            "oneclick" => Some(Self::OneClick),
            _ => None,
        }
    }
}

/// Immutable acknowledgment proof, one per assignment.
#[derive(Debug, Clone)]
pub struct AckRecord {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub signer_name: String,
    pub signer_email: String,
    pub typed_signature: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub policy_version: i32,
    pub policy_hash_at_ack: String,
    pub method: AckMethod,
    pub created_at: DateTime<Utc>,
}

/// Pending login challenge for one email address.
#[derive(Debug, Clone)]
pub struct AuthChallenge {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub magic_id: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl AuthChallenge {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Request-scoped tenant context derived once from a verified access token.
/// Every admin operation receives this and repositories apply the workspace
/// predicate from it in exactly one place.
#[derive(Debug, Clone, Copy)]
pub struct Tenant {
    pub user_id: Uuid,
    pub workspace_id: Uuid,
    pub role: UserRole,
}

impl Tenant {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Client metadata captured at acknowledgment time.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
