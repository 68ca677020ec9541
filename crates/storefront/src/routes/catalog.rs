//! Catalog route handlers: the menu and the "create burger" form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::burger::{Burger, BurgerForm, NewBurger};
use crate::state::AppState;

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "buying.html")]
pub struct BuyingTemplate {
    pub username: String,
    pub burgers: Vec<Burger>,
}

/// "Create burger" form template.
#[derive(Template, WebTemplate)]
#[template(path = "create_burger.html")]
pub struct CreateBurgerTemplate {
    pub username: String,
}

/// Display the menu.
#[instrument(skip(state, user), fields(username = %user.username))]
pub async fn buying(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let burgers = state.catalog().list_all().await?;

    Ok(BuyingTemplate {
        username: user.username.into_inner(),
        burgers,
    })
}

/// Display the "create burger" form.
pub async fn create_burger_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    CreateBurgerTemplate {
        username: user.username.into_inner(),
    }
}

/// Handle "create burger" form submission.
#[instrument(skip(state, user, form), fields(username = %user.username))]
pub async fn create_burger(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<BurgerForm>,
) -> Result<Response> {
    let new_burger = NewBurger::from_form(&form).inspect_err(|e| {
        tracing::warn!(error = %e, "Rejected burger form");
    })?;

    let burger = state.catalog().create(&new_burger).await?;
    tracing::info!(burger_id = %burger.id, "Burger created");

    Ok(Redirect::to("/buying").into_response())
}
