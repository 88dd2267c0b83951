use axum::{routing::get, Router};

use crate::{routes::pages, state::AppState};

mod dto;
pub mod extractors;
pub mod handlers;

pub(crate) use dto::UpdateAccountRequest;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            get(pages::register_page).post(handlers::register),
        )
        .route("/verify", get(handlers::verify))
        .route("/login", get(pages::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
}
