use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::fingerprint::content_fingerprint;
use crate::domain::repository::{ObjectStore, PolicyRepository};
use crate::domain::types::{Policy, Tenant};
use crate::error::PolicyServiceError;

/// Compute the content fingerprint, fetching attachment bytes when the
/// policy carries one.
async fn fingerprint_content<S: ObjectStore>(
    store: &S,
    title: &str,
    body: Option<&str>,
    file_key: Option<&str>,
) -> Result<String, PolicyServiceError> {
    let file_bytes = match file_key {
        Some(key) => Some(store.download(key).await?),
        None => None,
    };
    Ok(content_fingerprint(title, body, file_bytes.as_deref()))
}

pub struct CreatePolicyInput {
    pub tenant: Tenant,
    pub title: String,
    pub body_markdown: Option<String>,
    pub file_key: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub require_typed_signature: bool,
}

pub struct CreatePolicyUseCase<P, S>
where
    P: PolicyRepository,
    S: ObjectStore,
{
    pub policies: P,
    pub store: S,
}

impl<P, S> CreatePolicyUseCase<P, S>
where
    P: PolicyRepository,
    S: ObjectStore,
{
    pub async fn execute(&self, input: CreatePolicyInput) -> Result<Policy, PolicyServiceError> {
        // A policy with neither body nor attachment has nothing to acknowledge
        let has_body = input.body_markdown.as_deref().is_some_and(|b| !b.trim().is_empty());
        if !has_body && input.file_key.is_none() {
            return Err(PolicyServiceError::MissingContent);
        }

        let content_sha256 = fingerprint_content(
            &self.store,
            &input.title,
            input.body_markdown.as_deref(),
            input.file_key.as_deref(),
        )
        .await?;

        let policy = Policy {
            id: Uuid::new_v4(),
            workspace_id: input.tenant.workspace_id,
            title: input.title,
            body_markdown: input.body_markdown,
            file_key: input.file_key,
            content_sha256,
            version: 1,
            due_at: input.due_at,
            require_typed_signature: input.require_typed_signature,
            created_by: input.tenant.user_id,
            created_at: Utc::now(),
        };
        self.policies.create(&policy).await?;
        Ok(policy)
    }
}

/// `None` fields are left unchanged.
pub struct UpdatePolicyInput {
    pub tenant: Tenant,
    pub policy_id: Uuid,
    pub title: Option<String>,
    pub body_markdown: Option<String>,
    pub file_key: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub require_typed_signature: Option<bool>,
}

pub struct UpdatePolicyUseCase<P, S>
where
    P: PolicyRepository,
    S: ObjectStore,
{
    pub policies: P,
    pub store: S,
}

impl<P, S> UpdatePolicyUseCase<P, S>
where
    P: PolicyRepository,
    S: ObjectStore,
{
    pub async fn execute(&self, input: UpdatePolicyInput) -> Result<Policy, PolicyServiceError> {
        let mut policy = self
            .policies
            .find_by_id(input.tenant, input.policy_id)
            .await?
            .ok_or(PolicyServiceError::PolicyNotFound)?;

        let content_changed =
            input.title.is_some() || input.body_markdown.is_some() || input.file_key.is_some();

        if content_changed {
            // Existing acknowledgments pin the old hash; the content they
            // attest to must not change out from under them
            if self.policies.acknowledged_count(policy.id).await? > 0 {
                return Err(PolicyServiceError::ContentLocked);
            }

            if let Some(title) = input.title {
                policy.title = title;
            }
            if let Some(body) = input.body_markdown {
                policy.body_markdown = Some(body);
            }
            if let Some(file_key) = input.file_key {
                policy.file_key = Some(file_key);
            }

            policy.content_sha256 = fingerprint_content(
                &self.store,
                &policy.title,
                policy.body_markdown.as_deref(),
                policy.file_key.as_deref(),
            )
            .await?;
            policy.version += 1;
        }

        // Due date and signature requirement are metadata, not content
        if let Some(due_at) = input.due_at {
            policy.due_at = Some(due_at);
        }
        if let Some(flag) = input.require_typed_signature {
            policy.require_typed_signature = flag;
        }

        self.policies.update(&policy).await?;
        Ok(policy)
    }
}

pub struct DeletePolicyUseCase<P>
where
    P: PolicyRepository,
{
    pub policies: P,
}

impl<P> DeletePolicyUseCase<P>
where
    P: PolicyRepository,
{
    pub async fn execute(&self, tenant: Tenant, policy_id: Uuid) -> Result<(), PolicyServiceError> {
        let policy = self
            .policies
            .find_by_id(tenant, policy_id)
            .await?
            .ok_or(PolicyServiceError::PolicyNotFound)?;

        if self.policies.assignment_count(policy.id).await? > 0 {
            return Err(PolicyServiceError::PolicyInUse);
        }
        self.policies.delete(policy.id).await
    }
}
