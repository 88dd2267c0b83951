use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::state::AppState;

pub mod account;
pub mod admin;
pub mod pages;

/// 302 Found to `location`.
pub fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index_page))
        .merge(account::account_routes())
        .merge(admin::admin_routes())
}
