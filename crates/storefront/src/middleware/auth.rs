//! Authentication extractors.
//!
//! Gate route handlers on the signed session tokens. Identity always comes
//! from the request's own `bs_user` token.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use super::session::ClientSession;
use crate::models::session::{CurrentUser, TokenKind};
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// If the request carries no valid login token, redirects to the landing page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for the session extractors: a plain redirect, no error body.
#[derive(Debug)]
pub enum SessionRejection {
    /// No valid login token; back to the landing page.
    RedirectToLanding,
    /// No purchase flag; back to the catalog.
    RedirectToCatalog,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLanding => Redirect::to("/").into_response(),
            Self::RedirectToCatalog => Redirect::to("/buying").into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = ClientSession::from_headers(state.tokens().clone(), &parts.headers);
        session
            .get::<CurrentUser>(TokenKind::User)
            .map(Self)
            .ok_or(SessionRejection::RedirectToLanding)
    }
}

/// Extractor that optionally gets the logged-in user.
///
/// Unlike `RequireAuth`, this never rejects the request.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = ClientSession::from_headers(state.tokens().clone(), &parts.headers);
        Ok(Self(session.get::<CurrentUser>(TokenKind::User)))
    }
}

/// Extractor that requires the purchase flag.
///
/// Does not check login; put `RequireAuth` before it in the handler
/// signature so unauthenticated requests go to the landing page first.
pub struct RequirePurchase;

impl FromRequestParts<AppState> for RequirePurchase {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = ClientSession::from_headers(state.tokens().clone(), &parts.headers);
        match session.get::<bool>(TokenKind::Purchase) {
            Some(true) => Ok(Self),
            _ => Err(SessionRejection::RedirectToCatalog),
        }
    }
}
