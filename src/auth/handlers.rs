use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use cookie::CookieJar;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, VerifyQuery},
        extractors::Payload,
    },
    error::AppError,
    mail::Mail,
    routes::found,
    session::{admin_cookie, admin_cookie_removal, request_jar, with_cookies, ADMIN_EMAIL},
    state::AppState,
    store::NewUser,
};

pub const REGISTERED: &str =
    "Registration successful! Please check your email to verify your account.";
const INVALID_TOKEN: &str = "Invalid or expired verification token";

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Payload(payload): Payload<RegisterRequest>,
) -> Result<&'static str, AppError> {
    let RegisterRequest {
        first_name,
        last_name,
        email,
        password,
    } = payload;

    // Duplicate check and insert share one write guard.
    {
        let mut users = state.users.write().await;
        let inserted = users
            .insert(NewUser {
                first_name: first_name.clone(),
                last_name,
                email: email.clone(),
                password,
            })
            .map(|u| u.id);
        match inserted {
            Some(user_id) => info!(user_id, %email, "user registered"),
            None => {
                warn!(%email, "email already registered");
                return Err(AppError::BadRequest("Email already exists"));
            }
        }
    }

    let token = state.tokens.write().await.issue(&email);
    let link = state.config.verify_link(&token);
    let mail = Mail::verification(&state.config.mail.user, &email, &first_name, &link);

    // No lock is held here; the user stays stored even if sending fails.
    if let Err(e) = state.mailer.send(mail).await {
        error!(error = %e, %email, "sending verification email failed");
        return Err(AppError::Internal("Error sending verification email"));
    }

    Ok(REGISTERED)
}

#[instrument(skip(state, query))]
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Response, AppError> {
    let Some(token) = query.token else {
        warn!("verify without token");
        return Err(AppError::BadRequest(INVALID_TOKEN));
    };

    let mut tokens = state.tokens.write().await;
    let Some(email) = tokens.email_for(&token).map(str::to_owned) else {
        warn!("unknown verification token");
        return Err(AppError::BadRequest(INVALID_TOKEN));
    };

    if !state.users.write().await.mark_verified(&email) {
        warn!(%email, "verification token points at a missing user");
        return Err(AppError::BadRequest(INVALID_TOKEN));
    }
    tokens.consume(&token);

    info!(%email, "email verified");
    Ok(found("/login"))
}

#[instrument(skip(state, headers, payload))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Payload(payload): Payload<LoginRequest>,
) -> Result<Response, AppError> {
    let user = state
        .users
        .read()
        .await
        .find_by_credentials(&payload.email, &payload.password)
        .cloned();

    let Some(user) = user else {
        warn!(email = %payload.email, "login with invalid credentials");
        return Err(AppError::Unauthorized("Invalid credentials"));
    };
    if !user.is_verified {
        warn!(user_id = user.id, "login before email verification");
        return Err(AppError::Forbidden("Please verify your email first"));
    }

    let is_admin = user.email == ADMIN_EMAIL;
    info!(user_id = user.id, email = %user.email, is_admin, "user logged in");

    let mut jar = request_jar(&headers);
    let existing = state.sessions.session_id(&headers);
    state.sessions.login(&mut jar, existing, user).await;
    jar.add(admin_cookie(is_admin));

    Ok(with_cookies(&jar, found("/home")))
}

#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = state.sessions.session_id(&headers) {
        if state.sessions.destroy(&id).await {
            info!("session destroyed");
        }
    }

    let mut jar = CookieJar::new();
    jar.add(admin_cookie_removal());
    with_cookies(&jar, found("/login"))
}
