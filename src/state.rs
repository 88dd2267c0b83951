use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::config::AppConfig;
use crate::mail::{HttpMailer, Mailer};
use crate::session::SessionStore;
use crate::store::{TokenStore, UserStore};

/// Everything a handler can reach. Built once in `main` and dropped at exit.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<RwLock<UserStore>>,
    pub tokens: Arc<RwLock<TokenStore>>,
    pub sessions: Arc<SessionStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        if config.mail.user.is_empty() || config.mail.pass.is_empty() {
            warn!("EMAIL_USER/EMAIL_PASS not set; verification emails will fail to send");
        }
        let mailer = Arc::new(HttpMailer::new(&config.mail)?) as Arc<dyn Mailer>;

        Self::from_parts(config, mailer)
    }

    pub fn from_parts(config: Arc<AppConfig>, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let sessions = Arc::new(SessionStore::new(&config.session)?);
        Ok(Self {
            config,
            users: Arc::new(RwLock::new(UserStore::new())),
            tokens: Arc::new(RwLock::new(TokenStore::new())),
            sessions,
            mailer,
        })
    }

    #[cfg(test)]
    pub fn fake(mailer: Arc<dyn Mailer>) -> Self {
        use crate::config::{MailConfig, SessionConfig};
        use std::path::PathBuf;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            public_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/public")),
            base_url: "http://localhost:3000".into(),
            session: SessionConfig {
                secret: "test-secret".into(),
                cookie_name: "sid".into(),
            },
            mail: MailConfig {
                user: "noreply@example.com".into(),
                pass: "test".into(),
                api_url: "http://mail.invalid/emails".into(),
            },
        });
        Self::from_parts(config, mailer).expect("fake state")
    }
}
