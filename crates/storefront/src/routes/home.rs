//! Landing page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect};
use tracing::instrument;

use crate::middleware::OptionalAuth;

/// Landing page template: login and registration forms.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// Logged-in username, if any.
    pub username: Option<String>,
    /// Message from a failed login or registration.
    pub error: Option<String>,
}

impl IndexTemplate {
    /// Landing page showing `error` to an anonymous visitor.
    #[must_use]
    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            username: None,
            error: Some(error.into()),
        }
    }
}

/// Display the landing page.
#[instrument(skip(user))]
pub async fn index(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    IndexTemplate {
        username: user.map(|u| u.username.into_inner()),
        error: None,
    }
}

/// There is no separate login page; the forms live on the landing page.
pub async fn login_page() -> Redirect {
    Redirect::to("/")
}
