use axum::{extract::State, response::Html, response::Response, routing::get, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        extractors::{Payload, SessionUser},
        UpdateAccountRequest,
    },
    error::AppError,
    routes::{found, pages::page},
    state::AppState,
};

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/home", get(home_page))
        .route("/account", get(account_page).post(update_account))
}

pub async fn home_page(
    State(state): State<AppState>,
    _session: SessionUser,
) -> Result<Html<String>, AppError> {
    page(&state, "home.html").await
}

pub async fn account_page(
    State(state): State<AppState>,
    _session: SessionUser,
) -> Result<Html<String>, AppError> {
    page(&state, "account.html").await
}

/// Changes the email of the session's user, in the store and in the session
/// snapshot. Uniqueness is not re-checked.
#[instrument(skip(state, session, payload), fields(user_id = session.user.id))]
pub async fn update_account(
    State(state): State<AppState>,
    session: SessionUser,
    Payload(payload): Payload<UpdateAccountRequest>,
) -> Result<Response, AppError> {
    let updated = state
        .users
        .write()
        .await
        .update_email(session.user.id, &payload.email);

    if !updated {
        warn!("session user no longer in store");
        return Err(AppError::NotFound("User not found"));
    }
    state
        .sessions
        .set_email(&session.session_id, &payload.email)
        .await;

    info!(email = %payload.email, "account email updated");
    Ok(found("/account"))
}
