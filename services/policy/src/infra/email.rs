use crate::domain::repository::Notifier;
use crate::error::PolicyServiceError;

/// Email delivery through the provider's HTTP API. Every send returns the
/// provider message id; any transport or provider error collapses to
/// `NotificationFailed` after a warn log.
#[derive(Clone)]
pub struct HttpNotifier {
    pub http: reqwest::Client,
    pub api_url: String,
    pub api_key: String,
    pub frontend_url: String,
}

#[derive(serde::Deserialize)]
struct SendResponse {
    id: String,
}

impl HttpNotifier {
    async fn deliver(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, PolicyServiceError> {
        let response = self
            .http
            .post(format!("{}/messages", self.api_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "to": to,
                "subject": subject,
                "body": body,
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "email provider unreachable");
                PolicyServiceError::NotificationFailed
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "email provider rejected message");
            return Err(PolicyServiceError::NotificationFailed);
        }

        let parsed: SendResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "email provider response unreadable");
            PolicyServiceError::NotificationFailed
        })?;
        Ok(parsed.id)
    }

    fn login_link(&self, magic_id: &str) -> String {
        format!("{}/login/{}", self.frontend_url.trim_end_matches('/'), magic_id)
    }
}

impl Notifier for HttpNotifier {
    async fn send_login_code(
        &self,
        email: &str,
        code: &str,
        magic_id: &str,
    ) -> Result<String, PolicyServiceError> {
        let body = format!(
            "Your login code is {code}. It expires in 10 minutes.\n\n\
             Or sign in directly: {}",
            self.login_link(magic_id),
        );
        self.deliver(email, "Your login code", &body).await
    }

    async fn send_assignment_email(
        &self,
        email: &str,
        policy_title: &str,
        ack_url: &str,
    ) -> Result<String, PolicyServiceError> {
        let body = format!(
            "You have been asked to review and acknowledge \"{policy_title}\".\n\n\
             Review it here: {ack_url}"
        );
        self.deliver(email, &format!("Action required: {policy_title}"), &body)
            .await
    }

    async fn send_reminder(
        &self,
        email: &str,
        policy_title: &str,
        ack_url: &str,
        reminder_number: i32,
    ) -> Result<String, PolicyServiceError> {
        let body = format!(
            "Reminder {reminder_number}: \"{policy_title}\" is still waiting for your \
             acknowledgment.\n\nReview it here: {ack_url}"
        );
        self.deliver(email, &format!("Reminder: {policy_title}"), &body)
            .await
    }

    async fn send_ack_confirmation(
        &self,
        email: &str,
        policy_title: &str,
    ) -> Result<String, PolicyServiceError> {
        let body =
            format!("This confirms your acknowledgment of \"{policy_title}\". Thank you.");
        self.deliver(email, &format!("Acknowledged: {policy_title}"), &body)
            .await
    }
}
