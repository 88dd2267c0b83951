use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub cookie_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub user: String,
    pub pass: String,
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
    pub base_url: String,
    pub session: SessionConfig,
    pub mail: MailConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env_or("PORT", "3000")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;
        let session = SessionConfig {
            secret: env_or("SESSION_SECRET", "your-secret-key"),
            cookie_name: env_or("SESSION_COOKIE", "sid"),
        };
        let mail = MailConfig {
            user: env_or("EMAIL_USER", ""),
            pass: env_or("EMAIL_PASS", ""),
            api_url: env_or("MAIL_API_URL", "https://api.resend.com/emails"),
        };
        Ok(Self {
            host: env_or("APP_HOST", "0.0.0.0"),
            port,
            public_dir: PathBuf::from(env_or("PUBLIC_DIR", "public")),
            base_url: env_or("PUBLIC_BASE_URL", "http://localhost:3000"),
            session,
            mail,
        })
    }

    pub fn verify_link(&self, token: &str) -> String {
        format!("{}/verify?token={}", self.base_url.trim_end_matches('/'), token)
    }
}
