use std::collections::HashMap;

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use cookie::{Cookie, CookieJar, Key};
use sha2::{Digest, Sha512};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::SessionConfig, store::User};

pub const ADMIN_COOKIE: &str = "Admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Server-side sessions keyed by a random id carried in a signed cookie.
/// Each session holds a snapshot of the user taken at login.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, User>>,
    key: Key,
    cookie_name: String,
}

impl SessionStore {
    pub fn new(cfg: &SessionConfig) -> anyhow::Result<Self> {
        // Key wants 64 bytes of material; SHA-512 of the secret gives exactly that.
        let digest = Sha512::digest(cfg.secret.as_bytes());
        let key = Key::try_from(digest.as_slice())
            .map_err(|e| anyhow::anyhow!("derive session key: {e:?}"))?;
        Ok(Self {
            sessions: RwLock::new(HashMap::new()),
            key,
            cookie_name: cfg.cookie_name.clone(),
        })
    }

    /// Session id from a correctly signed session cookie, if any.
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        request_jar(headers)
            .signed(&self.key)
            .get(&self.cookie_name)
            .map(|c| c.value().to_string())
    }

    pub async fn user(&self, id: &str) -> Option<User> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Binds `user` to the caller's live session, or opens a new one and
    /// queues its signed cookie on `jar`.
    pub async fn login(&self, jar: &mut CookieJar, existing: Option<String>, user: User) {
        let mut sessions = self.sessions.write().await;
        if let Some(id) = existing {
            if let Some(slot) = sessions.get_mut(&id) {
                *slot = user;
                return;
            }
        }
        let id = Uuid::new_v4().to_string();
        debug!(session = %id, user_id = user.id, "session created");
        sessions.insert(id.clone(), user);
        jar.signed_mut(&self.key).add(
            Cookie::build((self.cookie_name.clone(), id))
                .path("/")
                .http_only(true),
        );
    }

    pub async fn set_email(&self, id: &str, email: &str) {
        if let Some(user) = self.sessions.write().await.get_mut(id) {
            user.email = email.to_string();
        }
    }

    pub async fn destroy(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }
}

/// Parses every `Cookie` request header into a jar of original cookies.
pub fn request_jar(headers: &HeaderMap) -> CookieJar {
    let mut jar = CookieJar::new();
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for cookie in Cookie::split_parse(raw).flatten() {
            jar.add_original(cookie.into_owned());
        }
    }
    jar
}

/// First cookie named `name` in header order, percent-decoded with surrounding
/// double quotes removed. Later duplicates are ignored.
pub fn first_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse_encoded(raw).flatten())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value_trimmed().to_string())
}

/// Client-visible admin flag. Neither HttpOnly nor signed.
pub fn admin_cookie(is_admin: bool) -> Cookie<'static> {
    let value = if is_admin { "true" } else { "false" };
    Cookie::build((ADMIN_COOKIE, value)).path("/").build()
}

pub fn admin_cookie_removal() -> Cookie<'static> {
    let mut cookie = Cookie::build((ADMIN_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Appends one `Set-Cookie` header per cookie changed in `jar`.
pub fn with_cookies(jar: &CookieJar, response: impl IntoResponse) -> Response {
    let mut res = response.into_response();
    for cookie in jar.delta() {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, name = cookie.name(), "unencodable cookie dropped"),
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(secret: &str) -> SessionStore {
        SessionStore::new(&SessionConfig {
            secret: secret.into(),
            cookie_name: "sid".into(),
        })
        .unwrap()
    }

    fn user() -> User {
        User {
            id: 1,
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@x.com".into(),
            password: "p".into(),
            is_verified: true,
        }
    }

    fn headers_from(jar: &CookieJar) -> HeaderMap {
        let pairs: Vec<String> = jar
            .delta()
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, pairs.join("; ").parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn login_issues_signed_cookie_resolving_to_user() {
        let sessions = store("secret");
        let mut jar = CookieJar::new();
        sessions.login(&mut jar, None, user()).await;

        let headers = headers_from(&jar);
        let id = sessions.session_id(&headers).expect("signed id");
        assert_eq!(sessions.user(&id).await.map(|u| u.email), Some("a@x.com".into()));
    }

    #[tokio::test]
    async fn cookie_signed_with_other_secret_is_ignored() {
        let issuer = store("one");
        let verifier = store("two");
        let mut jar = CookieJar::new();
        issuer.login(&mut jar, None, user()).await;
        assert!(verifier.session_id(&headers_from(&jar)).is_none());
    }

    #[tokio::test]
    async fn unsigned_id_is_rejected() {
        let sessions = store("secret");
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "sid=plain-id".parse().unwrap());
        assert!(sessions.session_id(&headers).is_none());
    }

    #[tokio::test]
    async fn relogin_reuses_live_session_and_destroy_ends_it() {
        let sessions = store("secret");
        let mut jar = CookieJar::new();
        sessions.login(&mut jar, None, user()).await;
        let id = sessions.session_id(&headers_from(&jar)).unwrap();

        let mut second = CookieJar::new();
        let mut other = user();
        other.email = "b@x.com".into();
        sessions.login(&mut second, Some(id.clone()), other).await;
        assert_eq!(second.delta().count(), 0);
        assert_eq!(sessions.user(&id).await.map(|u| u.email), Some("b@x.com".into()));

        sessions.set_email(&id, "c@x.com").await;
        assert_eq!(sessions.user(&id).await.map(|u| u.email), Some("c@x.com".into()));

        assert!(sessions.destroy(&id).await);
        assert!(sessions.user(&id).await.is_none());
    }

    #[test]
    fn admin_cookie_values() {
        assert_eq!(admin_cookie(true).to_string(), "Admin=true; Path=/");
        assert_eq!(admin_cookie(false).value(), "false");
        let removal = admin_cookie_removal();
        assert_eq!(removal.value(), "");
        assert!(removal.expires().is_some());
    }

    #[test]
    fn first_cookie_value_decodes_and_keeps_first_duplicate() {
        let cases = [
            ("Admin=true", Some("true")),
            ("Admin=\"true\"", Some("true")),
            ("Admin=tru%65", Some("true")),
            ("Admin=true; Admin=false", Some("true")),
            ("Admin=false; Admin=true", Some("false")),
            ("other=1", None),
        ];
        for (raw, expected) in cases {
            let mut headers = HeaderMap::new();
            headers.insert(header::COOKIE, raw.parse().unwrap());
            assert_eq!(
                first_cookie_value(&headers, ADMIN_COOKIE).as_deref(),
                expected,
                "{raw}"
            );
        }

        let mut split = HeaderMap::new();
        split.append(header::COOKIE, "x=1; Admin=false".parse().unwrap());
        split.append(header::COOKIE, "Admin=true".parse().unwrap());
        assert_eq!(first_cookie_value(&split, ADMIN_COOKIE).as_deref(), Some("false"));
    }

    #[test]
    fn request_jar_reads_all_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, "Admin=true; other=1".parse().unwrap());
        headers.append(header::COOKIE, "x=y".parse().unwrap());
        let jar = request_jar(&headers);
        assert_eq!(jar.get(ADMIN_COOKIE).map(|c| c.value()), Some("true"));
        assert_eq!(jar.get("x").map(|c| c.value()), Some("y"));
    }
}
