use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::MailConfig;

/// Outgoing transactional message.
#[derive(Debug, Clone, Serialize)]
pub struct Mail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl Mail {
    pub fn verification(from: &str, to: &str, first_name: &str, link: &str) -> Self {
        Self {
            from: from.to_string(),
            to: vec![to.to_string()],
            subject: "Verify Your Account".into(),
            text: format!(
                "Hello {first_name},\n\nPlease verify your account by clicking the following link:\n{link}\n\nThank you!"
            ),
            html: format!(
                "<p>Hello {first_name},</p><p>Please verify your account by clicking the following link:</p><a href=\"{link}\">Verify Account</a><p>Thank you!</p>"
            ),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: Mail) -> anyhow::Result<()>;
}

/// Sends mail through an HTTP transactional email API (bearer-key JSON POST).
#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent("user-portal/0.1 (+reqwest)")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("build mail http client")?;
        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            api_key: cfg.pass.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: Mail) -> anyhow::Result<()> {
        debug!(to = ?mail.to, subject = %mail.subject, api = %self.api_url, "sending mail");
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&mail)
            .send()
            .await
            .context("mail api request")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("mail api returned {status}: {body}");
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::Mutex;

    use super::*;

    /// Keeps every message in memory; can be told to fail.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<Mail>>,
        fail: AtomicBool,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            let mailer = Self::default();
            mailer.fail.store(true, Ordering::SeqCst);
            mailer
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: Mail) -> anyhow::Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("smtp unavailable");
            }
            self.sent.lock().await.push(mail);
            Ok(())
        }
    }
}
