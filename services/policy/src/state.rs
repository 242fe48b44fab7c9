use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbAssignmentRepository, DbAuthChallengeRepository, DbPolicyRepository, DbUserRepository,
};
use crate::infra::email::HttpNotifier;
use crate::infra::storage::HttpObjectStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub http: reqwest::Client,
    pub jwt_secret: String,
    pub frontend_url: String,
    pub email_api_url: String,
    pub email_api_key: String,
    pub storage_base_url: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn policy_repo(&self) -> DbPolicyRepository {
        DbPolicyRepository {
            db: self.db.clone(),
        }
    }

    pub fn assignment_repo(&self) -> DbAssignmentRepository {
        DbAssignmentRepository {
            db: self.db.clone(),
        }
    }

    pub fn challenge_repo(&self) -> DbAuthChallengeRepository {
        DbAuthChallengeRepository {
            db: self.db.clone(),
        }
    }

    pub fn notifier(&self) -> HttpNotifier {
        HttpNotifier {
            http: self.http.clone(),
            api_url: self.email_api_url.clone(),
            api_key: self.email_api_key.clone(),
            frontend_url: self.frontend_url.clone(),
        }
    }

    pub fn object_store(&self) -> HttpObjectStore {
        HttpObjectStore {
            http: self.http.clone(),
            base_url: self.storage_base_url.clone(),
        }
    }
}
