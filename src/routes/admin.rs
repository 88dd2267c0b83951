use axum::{
    extract::{Path, State},
    response::Html,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AdminCookie,
    error::AppError,
    routes::pages::page,
    state::AppState,
    store::User,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_page))
        .route("/api/users", get(list_users))
        .route("/api/users/:id", delete(delete_user))
}

pub async fn admin_page(
    _admin: AdminCookie,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    page(&state, "admin.html").await
}

/// Full store dump, passwords included.
pub async fn list_users(_admin: AdminCookie, State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.read().await.all().to_vec())
}

#[instrument(skip(_admin, state))]
pub async fn delete_user(
    _admin: AdminCookie,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> &'static str {
    let removed = match parse_leading_int(&raw_id) {
        Some(id) => state.users.write().await.remove(id),
        None => 0,
    };
    info!(removed, "delete user");
    "User deleted"
}

/// Leading-integer parse: skips leading whitespace, accepts a sign, stops at the
/// first non-digit. Negative or digitless input yields `None`.
fn parse_leading_int(raw: &str) -> Option<u64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value = rest[..end].parse::<u64>().ok()?;
    if negative && value != 0 {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::parse_leading_int;

    #[test]
    fn parses_like_leading_integer() {
        assert_eq!(parse_leading_int("3"), Some(3));
        assert_eq!(parse_leading_int("  12abc"), Some(12));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("-4"), None);
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
    }
}
