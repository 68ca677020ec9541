//! Authentication route handlers.
//!
//! Handles login, registration and logout. Success issues or clears the
//! signed `bs_user` token; failure re-renders the landing page with a message.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use super::home::IndexTemplate;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::SessionCookies;
use crate::models::session::{CurrentUser, TokenKind, USER_TOKEN_TTL};
use crate::models::user::User;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login and registration form data.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Routes
// =============================================================================

/// Handle login form submission.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => start_session(&state, user),
        Err(e) => Ok(login_failed(&e).into_response()),
    }
}

/// Handle registration form submission.
///
/// A new account is logged in straight away.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn create_user(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .register(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User registered");
            start_session(&state, user)
        }
        Err(e) => Ok(registration_failed(&e).into_response()),
    }
}

/// Handle logout: clear every session token.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut cookies = SessionCookies::new(&state);
    cookies.clear_all();
    clear_sentry_user();

    (cookies, Redirect::to("/")).into_response()
}

// =============================================================================
// Helpers
// =============================================================================

fn start_session(state: &AppState, user: User) -> Result<Response> {
    let current = CurrentUser {
        id: user.id,
        username: user.username,
    };

    let mut cookies = SessionCookies::new(state);
    cookies.issue(TokenKind::User, &current, USER_TOKEN_TTL)?;
    set_sentry_user(&current.id, current.username.as_str());

    Ok((cookies, Redirect::to("/buying")).into_response())
}

fn login_failed(e: &AuthError) -> IndexTemplate {
    report(e, "Login failed");
    IndexTemplate::with_error(e.login_message())
}

fn registration_failed(e: &AuthError) -> IndexTemplate {
    report(e, "Registration failed");
    IndexTemplate::with_error(e.registration_message())
}

fn report(e: &AuthError, what: &str) {
    if e.is_server_error() {
        let event_id = sentry::capture_error(e);
        tracing::error!(error = %e, sentry_event_id = %event_id, "{what}");
    } else {
        tracing::warn!(error = %e, "{what}");
    }
}
