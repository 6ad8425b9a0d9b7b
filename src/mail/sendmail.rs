// src/mail/sendmail.rs
use serde_json::json;
use tokio::time::{sleep, Duration};

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 1000;

pub type MailError = Box<dyn std::error::Error + Send + Sync>;

/// Transport for transactional mail: posts to the Resend HTTP API. The API
/// key and sender address are injected at construction, never read from
/// the environment at send time.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    api_key: String,
    from_email: String,
    client: reqwest::Client,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>, from_email: impl Into<String>) -> Self {
        ResendMailer {
            api_key: api_key.into(),
            from_email: from_email.into(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        if to_email.is_empty() {
            return Err("Email recipient cannot be empty".into());
        }
        if !to_email.contains('@') {
            return Err(format!("Invalid email address: {}", to_email).into());
        }

        self.send_with_retries(to_email, subject, text, html_body)
            .await
    }

    async fn send_with_retries(
        &self,
        to_email: &str,
        subject: &str,
        text: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.send_once(to_email, subject, text, html_body).await {
                Ok(email_id) => {
                    tracing::info!("✓ Email sent successfully to {} (id: {})", to_email, email_id);
                    return Ok(());
                }
                Err(e) => {
                    last_error = Some(e);
                    if attempt < MAX_RETRIES {
                        let delay = RETRY_DELAY_MS * (2_u64.pow(attempt - 1));
                        tracing::warn!(
                            "Email send attempt {} failed for {}. Retrying in {}ms...",
                            attempt,
                            to_email,
                            delay
                        );
                        sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }

        let error_msg = last_error
            .map(|e| format!("Failed after {} retries: {}", MAX_RETRIES, e))
            .unwrap_or_else(|| "Unknown email sending error".to_string());

        tracing::error!("✗ Email failed for {}: {}", to_email, error_msg);
        Err(error_msg.into())
    }

    async fn send_once(
        &self,
        to_email: &str,
        subject: &str,
        text: &str,
        html_body: &str,
    ) -> Result<String, String> {
        if self.api_key.is_empty() {
            return Err("Resend API key is not configured".to_string());
        }

        let request_body = json!({
            "from": self.from_email,
            "to": to_email,
            "subject": subject,
            "text": text,
            "html": html_body,
        });

        let response = self
            .client
            .post("https://api.resend.com/emails")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "No response body".to_string());

        if status.is_success() {
            if let Ok(body) = serde_json::from_str::<serde_json::Value>(&response_text) {
                if let Some(id) = body.get("id").and_then(|v| v.as_str()) {
                    return Ok(id.to_string());
                }
            }
            Ok("success".to_string())
        } else {
            Err(format!(
                "Resend API error ({}): {}",
                status.as_u16(),
                response_text
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_empty_and_malformed_recipients() {
        let mailer = ResendMailer::new("key", "Ticketdesk <noreply@ticketdesk.local>");

        assert!(mailer.send_email("", "s", "t", "<p>h</p>").await.is_err());
        assert!(mailer
            .send_email("not-an-address", "s", "t", "<p>h</p>")
            .await
            .is_err());
    }
}
