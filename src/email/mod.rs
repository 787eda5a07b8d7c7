//! Transactional email through the Resend HTTP API.
//!
//! Without an API key the mailer runs in development mode: the reset link is
//! logged instead of sent, so the flow can be exercised locally.

use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};
use url::Url;

use crate::config::Settings;
use crate::error::{AppError, EmailError};
use crate::Result;

const RESET_SUBJECT: &str = "პაროლის აღდგენა - WordFlow";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailDelivery {
    pub dev_mode: bool,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

pub struct Mailer {
    client: reqwest::Client,
    api_key: Option<String>,
    from: String,
    api_base: String,
    public_url: Url,
}

impl Mailer {
    pub fn new(settings: &Settings) -> Result<Self> {
        let public_url = Url::parse(&settings.server.public_url).map_err(|e| {
            AppError::ConfigError(format!(
                "Invalid server.public_url '{}': {}",
                settings.server.public_url, e
            ))
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: settings
                .email
                .resend_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            from: settings.email.from.clone(),
            api_base: settings.email.api_base.trim_end_matches('/').to_string(),
            public_url,
        })
    }

    pub fn is_dev_mode(&self) -> bool {
        self.api_key.is_none()
    }

    /// `{public_url}/reset-password/{token}`
    pub fn reset_url(&self, token: &str) -> Result<Url> {
        let mut url = self.public_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError("server.public_url cannot be a base URL".into()))?
            .pop_if_empty()
            .push("reset-password")
            .push(token);
        Ok(url)
    }

    pub async fn send_password_reset(&self, email: &str, token: &str) -> Result<EmailDelivery> {
        let reset_url = self.reset_url(token)?;

        let Some(api_key) = &self.api_key else {
            info!("Email delivery not configured. Password reset URL for {}: {}", email, reset_url);
            return Ok(EmailDelivery { dev_mode: true });
        };

        let request = SendEmailRequest {
            from: &self.from,
            to: [email],
            subject: RESET_SUBJECT,
            html: reset_email_html(reset_url.as_str()),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Email provider returned {} for {}: {}", status, email, body);
            return Err(EmailError::Rejected(status.as_u16()).into());
        }

        info!("Password reset email sent to {}", email);
        Ok(EmailDelivery { dev_mode: false })
    }
}

fn reset_email_html(reset_url: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h1 style="color: #2563eb;">WordFlow</h1>
  <h2>პაროლის აღდგენა</h2>
  <p>თქვენ მოითხოვეთ პაროლის აღდგენა. დააჭირეთ ქვემოთ მოცემულ ღილაკს ახალი პაროლის დასაყენებლად:</p>
  <a href="{url}" style="display: inline-block; background: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 8px; margin: 20px 0;">პაროლის აღდგენა</a>
  <p style="color: #666; font-size: 14px;">ეს ბმული მოქმედებს 1 საათის განმავლობაში.</p>
  <p style="color: #666; font-size: 14px;">თუ თქვენ არ მოგითხოვიათ პაროლის აღდგენა, უგულებელყოთ ეს წერილი.</p>
</div>"#,
        url = reset_url
    )
}
