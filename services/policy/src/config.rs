/// Policy service configuration loaded from environment variables.
#[derive(Debug)]
pub struct PolicyConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing access and magic-link tokens.
    pub jwt_secret: String,
    /// Frontend base URL; magic links are `{frontend_url}/ack/{token}`.
    pub frontend_url: String,
    /// Email provider API base URL.
    pub email_api_url: String,
    /// Email provider API key.
    pub email_api_key: String,
    /// Object storage base URL for policy attachments.
    pub storage_base_url: String,
    /// TCP port to listen on (default 3114). Env var: `POLICY_PORT`.
    pub policy_port: u16,
}

impl PolicyConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            frontend_url: std::env::var("FRONTEND_URL").expect("FRONTEND_URL"),
            email_api_url: std::env::var("EMAIL_API_URL").expect("EMAIL_API_URL"),
            email_api_key: std::env::var("EMAIL_API_KEY").expect("EMAIL_API_KEY"),
            storage_base_url: std::env::var("STORAGE_BASE_URL").expect("STORAGE_BASE_URL"),
            policy_port: std::env::var("POLICY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3114),
        }
    }
}
