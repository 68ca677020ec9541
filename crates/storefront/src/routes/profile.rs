//! Profile page: order history and delivery status.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::instrument;

use super::checkout::DeliveryView;
use crate::db::CustomizedBurgerRepository;
use crate::error::Result;
use crate::middleware::{ClientSession, RequireAuth, SessionCookies};
use crate::models::burger::CustomizedBurger;
use crate::models::session::{DeliveryStatus, TokenKind};
use crate::models::transaction::Transaction;
use crate::services::transactions::TransactionService;
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub username: String,
    pub customized: Vec<CustomizedBurger>,
    pub transactions: Vec<TransactionSummary>,
    pub delivery: Option<DeliveryView>,
}

/// One row of the transaction table.
#[derive(Debug, Clone)]
pub struct TransactionSummary {
    pub id: String,
    pub created_at: String,
    pub masked_card: String,
    pub method: &'static str,
    pub city: String,
}

impl From<&Transaction> for TransactionSummary {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id.to_string(),
            created_at: t.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            masked_card: t.details.payment.card_number.masked(),
            method: t.details.payment.method.label(),
            city: t.details.address.city.clone(),
        }
    }
}

/// Display the profile page.
///
/// A delivery token that no longer verifies, or whose window has passed, is
/// cleared.
#[instrument(skip_all, fields(username = %user.username))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: ClientSession,
) -> Result<Response> {
    let customized = CustomizedBurgerRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    let transactions = TransactionService::new(state.pool())
        .list_for_user(&user.username)
        .await?;

    let delivery = session
        .get::<DeliveryStatus>(TokenKind::Delivery)
        .and_then(|status| DeliveryView::at(&status, Utc::now()));

    let mut cookies = SessionCookies::new(&state);
    if delivery.is_none() && session.has_cookie(TokenKind::Delivery) {
        cookies.clear(TokenKind::Delivery);
    }

    Ok((
        cookies,
        ProfileTemplate {
            username: user.username.into_inner(),
            customized,
            transactions: transactions.iter().map(TransactionSummary::from).collect(),
            delivery,
        },
    )
        .into_response())
}
