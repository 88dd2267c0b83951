use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{
    error::AppError,
    routes::found,
    session::{first_cookie_value, ADMIN_COOKIE},
    state::AppState,
    store::User,
};

/// Session guard: a live session with a bound user, else a redirect to `/login`.
/// The user is the snapshot taken at login, not a fresh read of the store.
pub struct SessionUser {
    pub session_id: String,
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session_id) = state.sessions.session_id(&parts.headers) else {
            return Err(found("/login"));
        };
        match state.sessions.user(&session_id).await {
            Some(user) => Ok(SessionUser { session_id, user }),
            None => Err(found("/login")),
        }
    }
}

/// Admin guard: passes only when the first `Admin` cookie, decoded and unquoted,
/// is exactly `"true"`. Independent of any session.
#[derive(Debug)]
pub struct AdminCookie;

#[async_trait]
impl<S> FromRequestParts<S> for AdminCookie
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flag = first_cookie_value(&parts.headers, ADMIN_COOKIE);
        match flag.as_deref() {
            Some("true") => Ok(AdminCookie),
            other => {
                warn!(admin = ?other, path = %parts.uri.path(), "admin cookie check failed");
                Err(AppError::Forbidden("Access denied"))
            }
        }
    }
}

/// Body accepted either as JSON or as an urlencoded form, chosen by content type.
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Payload(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Payload(value))
        }
    }
}
