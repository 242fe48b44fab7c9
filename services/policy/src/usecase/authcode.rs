use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::{AuthChallengeRepository, Notifier, UserRepository};
use crate::domain::types::{
    AuthChallenge, LOGIN_CODE_TTL_MINS, LOGIN_MAGIC_ID_LEN, MAX_CODE_ATTEMPTS, StaffUser,
};
use crate::error::PolicyServiceError;

/// Charset for magic-link identifiers (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn generate_login_code() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(0..1_000_000))
}

fn generate_magic_id() -> String {
    let mut rng = rand::rng();
    (0..LOGIN_MAGIC_ID_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Successful login: a freshly minted access token plus the user it belongs
/// to, so handlers can echo the profile without a second lookup.
pub struct LoginGrant {
    pub access_token: String,
    pub expires_at: u64,
    pub user: StaffUser,
}

pub struct SendLoginCodeInput {
    pub email: String,
}

pub struct SendLoginCodeUseCase<U, A, N>
where
    U: UserRepository,
    A: AuthChallengeRepository,
    N: Notifier,
{
    pub users: U,
    pub challenges: A,
    pub notifier: N,
}

impl<U, A, N> SendLoginCodeUseCase<U, A, N>
where
    U: UserRepository,
    A: AuthChallengeRepository,
    N: Notifier,
{
    pub async fn execute(&self, input: SendLoginCodeInput) -> Result<(), PolicyServiceError> {
        // 1. Email must belong to a known staff member → 404 otherwise
        let user = self
            .users
            .find_by_email_any(&input.email)
            .await?
            .ok_or(PolicyServiceError::UserNotFound)?;

        // 2. Fresh challenge; replacing deletes any prior ones for this
        //    email, so exactly one challenge is ever live
        let now = Utc::now();
        let challenge = AuthChallenge {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            code: generate_login_code(),
            magic_id: generate_magic_id(),
            expires_at: now + Duration::minutes(LOGIN_CODE_TTL_MINS),
            used: false,
            attempts: 0,
            created_at: now,
        };
        self.challenges.replace_for_email(&challenge).await?;

        // 3. Deliver code + magic link in one email
        self.notifier
            .send_login_code(&user.email, &challenge.code, &challenge.magic_id)
            .await?;
        Ok(())
    }
}

pub struct VerifyLoginCodeInput {
    pub email: String,
    pub code: String,
}

pub struct VerifyLoginCodeUseCase<U, A>
where
    U: UserRepository,
    A: AuthChallengeRepository,
{
    pub users: U,
    pub challenges: A,
    pub jwt_secret: String,
}

impl<U, A> VerifyLoginCodeUseCase<U, A>
where
    U: UserRepository,
    A: AuthChallengeRepository,
{
    pub async fn execute(
        &self,
        input: VerifyLoginCodeInput,
    ) -> Result<LoginGrant, PolicyServiceError> {
        let now = Utc::now();

        // 1. Live challenge for this email; expired or absent looks the same
        let challenge = self
            .challenges
            .find_live_by_email(&input.email, now)
            .await?
            .ok_or(PolicyServiceError::ExpiredCredential)?;

        if challenge.used {
            return Err(PolicyServiceError::AlreadyUsed);
        }

        // 2. Attempt cap is enforced before comparing, so the fourth try
        //    never learns whether its guess was right
        if challenge.attempts >= MAX_CODE_ATTEMPTS {
            return Err(PolicyServiceError::AttemptsExceeded);
        }
        self.challenges.increment_attempts(challenge.id).await?;

        if challenge.code != input.code {
            return Err(PolicyServiceError::InvalidCredential);
        }

        // 3. Burn the challenge and mint the session
        self.challenges.mark_used(challenge.id).await?;
        grant_for_email(&self.users, &input.email, &self.jwt_secret).await
    }
}

pub struct VerifyLoginLinkInput {
    pub magic_id: String,
}

pub struct VerifyLoginLinkUseCase<U, A>
where
    U: UserRepository,
    A: AuthChallengeRepository,
{
    pub users: U,
    pub challenges: A,
    pub jwt_secret: String,
}

impl<U, A> VerifyLoginLinkUseCase<U, A>
where
    U: UserRepository,
    A: AuthChallengeRepository,
{
    pub async fn execute(
        &self,
        input: VerifyLoginLinkInput,
    ) -> Result<LoginGrant, PolicyServiceError> {
        let now = Utc::now();
        let challenge = self
            .challenges
            .find_live_by_magic_id(&input.magic_id, now)
            .await?
            .ok_or(PolicyServiceError::ExpiredCredential)?;

        if challenge.used {
            return Err(PolicyServiceError::AlreadyUsed);
        }

        self.challenges.mark_used(challenge.id).await?;
        grant_for_email(&self.users, &challenge.email, &self.jwt_secret).await
    }
}

async fn grant_for_email<U: UserRepository>(
    users: &U,
    email: &str,
    jwt_secret: &str,
) -> Result<LoginGrant, PolicyServiceError> {
    let user = users
        .find_by_email_any(email)
        .await?
        .ok_or(PolicyServiceError::UserNotFound)?;

    let (access_token, expires_at) = attest_token::sign_access_token(
        user.id,
        &user.email,
        user.role.as_str(),
        user.workspace_id,
        jwt_secret,
    )
    .map_err(|e| PolicyServiceError::Internal(anyhow::Error::new(e)))?;

    Ok(LoginGrant {
        access_token,
        expires_at,
        user,
    })
}
