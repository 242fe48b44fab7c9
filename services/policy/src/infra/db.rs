use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use attest_policy_schema::{acknowledgments, assignments, auth_codes, email_events, policies, users};

use crate::domain::repository::{
    AssignmentRepository, AuthChallengeRepository, PolicyRepository, UserRepository,
};
use crate::domain::types::{
    AckRecord, Assignment, AssignmentStatus, AuthChallenge, MAX_REMINDERS, Policy, StaffUser,
    Tenant, UserRole,
};
use crate::error::PolicyServiceError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(
        &self,
        workspace_id: Uuid,
        email: &str,
    ) -> Result<Option<StaffUser>, PolicyServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::WorkspaceId.eq(workspace_id))
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email_any(
        &self,
        email: &str,
    ) -> Result<Option<StaffUser>, PolicyServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email (any workspace)")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StaffUser>, PolicyServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
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
        users::ActiveModel {
            id: Set(user.id),
            workspace_id: Set(user.workspace_id),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            role: Set(user.role.as_str().to_owned()),
            department: Set(None),
            created_at: Set(user.created_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(user)
    }
}

fn user_from_model(model: users::Model) -> Result<StaffUser, PolicyServiceError> {
    let role = UserRole::from_str(&model.role)
        .ok_or_else(|| anyhow::anyhow!("unknown user role: {}", model.role))?;
    Ok(StaffUser {
        id: model.id,
        workspace_id: model.workspace_id,
        email: model.email,
        name: model.name,
        role,
        department: model.department,
        created_at: model.created_at,
    })
}

// ── Policy repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPolicyRepository {
    pub db: DatabaseConnection,
}

impl PolicyRepository for DbPolicyRepository {
    async fn find_by_id(
        &self,
        tenant: Tenant,
        id: Uuid,
    ) -> Result<Option<Policy>, PolicyServiceError> {
        let model = policies::Entity::find_by_id(id)
            .filter(policies::Column::WorkspaceId.eq(tenant.workspace_id))
            .one(&self.db)
            .await
            .context("find policy by id")?;
        Ok(model.map(policy_from_model))
    }

    async fn find_by_id_any(&self, id: Uuid) -> Result<Option<Policy>, PolicyServiceError> {
        let model = policies::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find policy by id (unscoped)")?;
        Ok(model.map(policy_from_model))
    }

    async fn create(&self, policy: &Policy) -> Result<(), PolicyServiceError> {
        policies::ActiveModel {
            id: Set(policy.id),
            workspace_id: Set(policy.workspace_id),
            title: Set(policy.title.clone()),
            body_markdown: Set(policy.body_markdown.clone()),
            file_key: Set(policy.file_key.clone()),
            content_sha256: Set(policy.content_sha256.clone()),
            version: Set(policy.version),
            due_at: Set(policy.due_at),
            require_typed_signature: Set(policy.require_typed_signature),
            created_by: Set(policy.created_by),
            created_at: Set(policy.created_at),
        }
        .insert(&self.db)
        .await
        .context("create policy")?;
        Ok(())
    }

    async fn update(&self, policy: &Policy) -> Result<(), PolicyServiceError> {
        policies::ActiveModel {
            id: Set(policy.id),
            title: Set(policy.title.clone()),
            body_markdown: Set(policy.body_markdown.clone()),
            file_key: Set(policy.file_key.clone()),
            content_sha256: Set(policy.content_sha256.clone()),
            version: Set(policy.version),
            due_at: Set(policy.due_at),
            require_typed_signature: Set(policy.require_typed_signature),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update policy")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), PolicyServiceError> {
        policies::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete policy")?;
        Ok(())
    }

    async fn acknowledged_count(&self, policy_id: Uuid) -> Result<u64, PolicyServiceError> {
        let count = assignments::Entity::find()
            .filter(assignments::Column::PolicyId.eq(policy_id))
            .filter(assignments::Column::Status.eq(AssignmentStatus::Acknowledged.as_str()))
            .count(&self.db)
            .await
            .context("count acknowledged assignments")?;
        Ok(count)
    }

    async fn assignment_count(&self, policy_id: Uuid) -> Result<u64, PolicyServiceError> {
        let count = assignments::Entity::find()
            .filter(assignments::Column::PolicyId.eq(policy_id))
            .count(&self.db)
            .await
            .context("count assignments")?;
        Ok(count)
    }
}

fn policy_from_model(model: policies::Model) -> Policy {
    Policy {
        id: model.id,
        workspace_id: model.workspace_id,
        title: model.title,
        body_markdown: model.body_markdown,
        file_key: model.file_key,
        content_sha256: model.content_sha256,
        version: model.version,
        due_at: model.due_at,
        require_typed_signature: model.require_typed_signature,
        created_by: model.created_by,
        created_at: model.created_at,
    }
}

// ── Assignment repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAssignmentRepository {
    pub db: DatabaseConnection,
}

impl AssignmentRepository for DbAssignmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>, PolicyServiceError> {
        let model = assignments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find assignment by id")?;
        model.map(assignment_from_model).transpose()
    }

    async fn find_for_policy_user(
        &self,
        policy_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Assignment>, PolicyServiceError> {
        let model = assignments::Entity::find()
            .filter(assignments::Column::PolicyId.eq(policy_id))
            .filter(assignments::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find assignment for policy + user")?;
        model.map(assignment_from_model).transpose()
    }

    async fn list_for_policy(
        &self,
        policy_id: Uuid,
    ) -> Result<Vec<Assignment>, PolicyServiceError> {
        let models = assignments::Entity::find()
            .filter(assignments::Column::PolicyId.eq(policy_id))
            .order_by_asc(assignments::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list assignments for policy")?;
        models.into_iter().map(assignment_from_model).collect()
    }

    async fn create(&self, assignment: &Assignment) -> Result<(), PolicyServiceError> {
        assignments::ActiveModel {
            id: Set(assignment.id),
            policy_id: Set(assignment.policy_id),
            user_id: Set(assignment.user_id),
            status: Set(assignment.status.as_str().to_owned()),
            viewed_at: Set(assignment.viewed_at),
            acknowledged_at: Set(assignment.acknowledged_at),
            reminder_count: Set(assignment.reminder_count),
            magic_link_token: Set(assignment.magic_link_token.clone()),
            created_at: Set(assignment.created_at),
        }
        .insert(&self.db)
        .await
        .context("create assignment")?;
        Ok(())
    }

    async fn mark_viewed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PolicyServiceError> {
        // Guarded on status so a concurrent acknowledge is never overwritten
        assignments::Entity::update_many()
            .col_expr(
                assignments::Column::Status,
                Expr::value(AssignmentStatus::Viewed.as_str()),
            )
            .col_expr(assignments::Column::ViewedAt, Expr::value(Some(at)))
            .filter(assignments::Column::Id.eq(id))
            .filter(assignments::Column::Status.eq(AssignmentStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .context("mark assignment viewed")?;
        Ok(())
    }

    async fn cache_magic_link(&self, id: Uuid, token: &str) -> Result<(), PolicyServiceError> {
        assignments::ActiveModel {
            id: Set(id),
            magic_link_token: Set(Some(token.to_owned())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("cache magic link token")?;
        Ok(())
    }

    async fn try_increment_reminder(&self, id: Uuid) -> Result<bool, PolicyServiceError> {
        // Bound and openness live in the WHERE clause, so the check and the
        // bump are one statement
        let result = assignments::Entity::update_many()
            .col_expr(
                assignments::Column::ReminderCount,
                Expr::col(assignments::Column::ReminderCount).add(1),
            )
            .filter(assignments::Column::Id.eq(id))
            .filter(assignments::Column::Status.is_in([
                AssignmentStatus::Pending.as_str(),
                AssignmentStatus::Viewed.as_str(),
            ]))
            .filter(assignments::Column::ReminderCount.lt(MAX_REMINDERS))
            .exec(&self.db)
            .await
            .context("increment reminder count")?;
        Ok(result.rows_affected > 0)
    }

    async fn rollback_reminder(&self, id: Uuid) -> Result<(), PolicyServiceError> {
        assignments::Entity::update_many()
            .col_expr(
                assignments::Column::ReminderCount,
                Expr::col(assignments::Column::ReminderCount).sub(1),
            )
            .filter(assignments::Column::Id.eq(id))
            .filter(assignments::Column::ReminderCount.gt(0))
            .exec(&self.db)
            .await
            .context("rollback reminder count")?;
        Ok(())
    }

    async fn record_acknowledgment(
        &self,
        record: &AckRecord,
        at: DateTime<Utc>,
    ) -> Result<(), PolicyServiceError> {
        let result = self
            .db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let record = record.clone();
                Box::pin(async move {
                    insert_acknowledgment(txn, &record).await?;
                    assignments::ActiveModel {
                        id: Set(record.assignment_id),
                        status: Set(AssignmentStatus::Acknowledged.as_str().to_owned()),
                        acknowledged_at: Set(Some(at)),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            // The unique index on assignment_id fired: a concurrent insert won
            Err(sea_orm::TransactionError::Transaction(db_err))
                if matches!(
                    db_err.sql_err(),
                    Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
                ) =>
            {
                Err(PolicyServiceError::IntegrityConflict)
            }
            Err(e) => Err(PolicyServiceError::Internal(
                anyhow::Error::new(e).context("record acknowledgment"),
            )),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), PolicyServiceError> {
        assignments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete assignment")?;
        Ok(())
    }

    async fn record_email_event(
        &self,
        assignment_id: Uuid,
        event_type: &str,
        provider_message_id: Option<&str>,
    ) -> Result<(), PolicyServiceError> {
        email_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            assignment_id: Set(assignment_id),
            event_type: Set(event_type.to_owned()),
            provider_message_id: Set(provider_message_id.map(str::to_owned)),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("record email event")?;
        Ok(())
    }
}

async fn insert_acknowledgment(
    txn: &DatabaseTransaction,
    record: &AckRecord,
) -> Result<(), sea_orm::DbErr> {
    acknowledgments::ActiveModel {
        id: Set(record.id),
        assignment_id: Set(record.assignment_id),
        signer_name: Set(record.signer_name.clone()),
        signer_email: Set(record.signer_email.clone()),
        typed_signature: Set(record.typed_signature.clone()),
        ip_address: Set(record.ip_address.clone()),
        user_agent: Set(record.user_agent.clone()),
        policy_version: Set(record.policy_version),
        policy_hash_at_ack: Set(record.policy_hash_at_ack.clone()),
        ack_method: Set(record.method.as_str().to_owned()),
        created_at: Set(record.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn assignment_from_model(model: assignments::Model) -> Result<Assignment, PolicyServiceError> {
    let status = AssignmentStatus::from_str(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown assignment status: {}", model.status))?;
    Ok(Assignment {
        id: model.id,
        policy_id: model.policy_id,
        user_id: model.user_id,
        status,
        viewed_at: model.viewed_at,
        acknowledged_at: model.acknowledged_at,
        reminder_count: model.reminder_count,
        magic_link_token: model.magic_link_token,
        created_at: model.created_at,
    })
}

// ── Login challenge repository ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthChallengeRepository {
    pub db: DatabaseConnection,
}

impl AuthChallengeRepository for DbAuthChallengeRepository {
    async fn replace_for_email(
        &self,
        challenge: &AuthChallenge,
    ) -> Result<(), PolicyServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let challenge = challenge.clone();
                Box::pin(async move {
                    auth_codes::Entity::delete_many()
                        .filter(auth_codes::Column::Email.eq(challenge.email.clone()))
                        .exec(txn)
                        .await?;
                    auth_codes::ActiveModel {
                        id: Set(challenge.id),
                        email: Set(challenge.email.clone()),
                        code: Set(challenge.code.clone()),
                        magic_id: Set(challenge.magic_id.clone()),
                        expires_at: Set(challenge.expires_at),
                        used: Set(challenge.used),
                        attempts: Set(challenge.attempts),
                        created_at: Set(challenge.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("replace login challenge")?;
        Ok(())
    }

    async fn find_live_by_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthChallenge>, PolicyServiceError> {
        let model = auth_codes::Entity::find()
            .filter(auth_codes::Column::Email.eq(email))
            .filter(auth_codes::Column::ExpiresAt.gt(now))
            .order_by_desc(auth_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find live challenge by email")?;
        Ok(model.map(challenge_from_model))
    }

    async fn find_live_by_magic_id(
        &self,
        magic_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthChallenge>, PolicyServiceError> {
        let model = auth_codes::Entity::find()
            .filter(auth_codes::Column::MagicId.eq(magic_id))
            .filter(auth_codes::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find live challenge by magic id")?;
        Ok(model.map(challenge_from_model))
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<(), PolicyServiceError> {
        auth_codes::Entity::update_many()
            .col_expr(
                auth_codes::Column::Attempts,
                Expr::col(auth_codes::Column::Attempts).add(1),
            )
            .filter(auth_codes::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("increment challenge attempts")?;
        Ok(())
    }

    async fn mark_used(&self, id: Uuid) -> Result<(), PolicyServiceError> {
        auth_codes::ActiveModel {
            id: Set(id),
            used: Set(true),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark challenge used")?;
        Ok(())
    }
}

fn challenge_from_model(model: auth_codes::Model) -> AuthChallenge {
    AuthChallenge {
        id: model.id,
        email: model.email,
        code: model.code,
        magic_id: model.magic_id,
        expires_at: model.expires_at,
        used: model.used,
        attempts: model.attempts,
        created_at: model.created_at,
    }
}
