use axum::{extract::State, response::Html};
use tracing::warn;

use crate::{error::AppError, state::AppState};

/// Reads an HTML page from the public directory and returns it verbatim.
pub async fn page(state: &AppState, name: &str) -> Result<Html<String>, AppError> {
    let path = state.config.public_dir.join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Ok(Html(body)),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "page not readable");
            Err(AppError::NotFound("Not Found"))
        }
    }
}

pub async fn index_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    page(&state, "index.html").await
}

pub async fn register_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    page(&state, "register.html").await
}

pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    page(&state, "login.html").await
}
