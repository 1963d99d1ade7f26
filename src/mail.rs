use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::MailConfig;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SendGrid not configured")]
    NotConfigured,
    #[error("SendGrid rejected message (status={status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("SendGrid request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

pub fn otp_email(to: &str, otp: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "CropBuddy: Your OTP".into(),
        html: format!("<p>Your OTP is: <strong>{otp}</strong></p>"),
    }
}

pub fn reset_email(to: &str, fullname: &str, link: &str, valid_secs: i64) -> Email {
    Email {
        to: to.to_string(),
        subject: "CropBuddy: Password reset link".into(),
        html: format!(
            "<p>Hello {fullname},</p>\
             <p>Click the link below to reset your password (valid {}):</p>\
             <p><a href=\"{link}\">{link}</a></p>",
            describe_window(valid_secs)
        ),
    }
}

fn describe_window(secs: i64) -> String {
    match secs {
        3600 => "1 hour".into(),
        s if s % 3600 == 0 => format!("{} hours", s / 3600),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{s} seconds"),
    }
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendBody<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

/// SendGrid v3 transactional mail. Sending is refused unless both sender and key are set.
#[derive(Clone)]
pub struct SendGridMailer {
    client: reqwest::Client,
    endpoint: String,
    from_email: Option<String>,
    api_key: Option<String>,
}

impl SendGridMailer {
    pub fn new(client: reqwest::Client, config: &MailConfig) -> Self {
        Self::with_endpoint(client, config, SENDGRID_SEND_URL)
    }

    pub fn with_endpoint(client: reqwest::Client, config: &MailConfig, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            from_email: config.from_email.clone(),
            api_key: config.sendgrid_api_key.clone(),
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let (Some(from), Some(api_key)) = (&self.from_email, &self.api_key) else {
            warn!("FROM_EMAIL or SENDGRID_API_KEY not set");
            return Err(MailError::NotConfigured);
        };

        let body = SendBody {
            personalizations: vec![Personalization {
                to: vec![Address { email: &email.to }],
            }],
            from: Address { email: from },
            subject: &email.subject,
            content: vec![Content {
                kind: "text/html",
                value: &email.html,
            }],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            info!(status = status.as_u16(), subject = %email.subject, "email sent");
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "sendgrid rejected message");
        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records every message; optionally fails like an unconfigured provider.
    #[derive(Clone, Default)]
    pub struct RecordingMailer {
        pub sent: Arc<Mutex<Vec<Email>>>,
        pub fail: bool,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn last(&self) -> Option<Email> {
            self.sent.lock().expect("mailer lock").last().cloned()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: Email) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::NotConfigured);
            }
            self.sent.lock().expect("mailer lock").push(email);
            Ok(())
        }
    }
}
