//! Checkout route handlers.
//!
//! The order flow, one request per step:
//!
//! ```text
//! browsing ──POST /customize──▶ customizing (GET /edit/{id})
//! customizing ──POST /edit/{id}──▶ confirming   (issues bs_pending)
//! confirming ──POST /confirmBuy──▶ paying
//! browsing ──POST /buy──▶ paying                 (base ingredients)
//! paying ──POST /finishbuy──▶ done               (issues bs_purchase, bs_delivery)
//! done ──POST /donebuy──▶ GET /onWay
//! ```

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use burgershop_core::{
    BurgerId, IngredientLine, PaymentMethod, PendingOrderId, normalize_ingredients,
};

use crate::error::{AppError, Result};
use crate::middleware::{ClientSession, RequireAuth, RequirePurchase, SessionCookies};
use crate::models::burger::Burger;
use crate::models::session::{
    DeliveryStatus, PENDING_ORDER_TTL, PURCHASE_TOKEN_TTL, TokenKind,
};
use crate::models::transaction::PaymentForm;
use crate::services::checkout::{CheckoutService, OrderInProgress};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// A burger picked from the menu.
#[derive(Debug, Deserialize)]
pub struct BurgerSelection {
    pub burger_id: BurgerId,
}

// =============================================================================
// Templates
// =============================================================================

/// Customization form: one quantity per ingredient.
#[derive(Template, WebTemplate)]
#[template(path = "customize.html")]
pub struct CustomizeTemplate {
    pub username: String,
    pub burger: Burger,
    pub lines: Vec<IngredientLine>,
    /// Empty rows for adding extra ingredients.
    pub extra_rows: usize,
}

/// Order review before payment.
#[derive(Template, WebTemplate)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub username: String,
    pub burger: Burger,
    pub lines: Vec<IngredientLine>,
}

/// Payment and delivery details form.
#[derive(Template, WebTemplate)]
#[template(path = "payment.html")]
pub struct PaymentTemplate {
    pub username: String,
    pub burger: Burger,
    pub lines: Vec<IngredientLine>,
    pub methods: Vec<(&'static str, &'static str)>,
}

/// Order placed.
#[derive(Template, WebTemplate)]
#[template(path = "done.html")]
pub struct DoneTemplate {
    pub username: String,
    pub burger_name: String,
    pub lines: Vec<IngredientLine>,
    pub transaction_id: String,
    pub masked_card: String,
    pub delivery: DeliveryView,
}

/// Order on its way.
#[derive(Template, WebTemplate)]
#[template(path = "on_way.html")]
pub struct OnWayTemplate {
    pub username: String,
    pub delivery: Option<DeliveryView>,
}

/// Delivery status as shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryView {
    pub message: String,
    pub minutes_remaining: i64,
}

impl DeliveryView {
    /// View of `status` at `now`; `None` once the delivery window has passed.
    #[must_use]
    pub fn at(status: &DeliveryStatus, now: DateTime<Utc>) -> Option<Self> {
        status.minutes_remaining(now).map(|minutes_remaining| Self {
            message: status.message.clone(),
            minutes_remaining,
        })
    }
}

impl PaymentTemplate {
    fn new(username: String, in_progress: OrderInProgress) -> Self {
        Self {
            username,
            burger: in_progress.burger,
            lines: in_progress.order.ingredients,
            methods: PaymentMethod::ALL
                .iter()
                .map(|m| (m.as_str(), m.label()))
                .collect(),
        }
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Pick a burger to customize.
#[instrument(skip(state, _user))]
pub async fn customize(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Form(selection): Form<BurgerSelection>,
) -> Result<Redirect> {
    let burger = CheckoutService::new(state.pool(), state.catalog())
        .burger(selection.burger_id)
        .await?;

    Ok(Redirect::to(&format!("/edit/{}", burger.id)))
}

/// Display the customization form.
#[instrument(skip(state, user), fields(username = %user.username))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<BurgerId>,
) -> Result<impl IntoResponse> {
    let burger = CheckoutService::new(state.pool(), state.catalog())
        .burger(id)
        .await?;

    Ok(CustomizeTemplate {
        username: user.username.into_inner(),
        lines: burger.default_lines(),
        burger,
        extra_rows: 2,
    })
}

/// Submit a customization: store it as a pending order and ask for confirmation.
#[instrument(skip(state, user, body), fields(username = %user.username))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<BurgerId>,
    body: Bytes,
) -> Result<Response> {
    let lines = parse_ingredient_form(&body);

    let in_progress = CheckoutService::new(state.pool(), state.catalog())
        .start(&user, id, &lines)
        .await?;

    let mut cookies = SessionCookies::new(&state);
    cookies.issue(TokenKind::PendingOrder, &in_progress.order.id, PENDING_ORDER_TTL)?;

    Ok((
        cookies,
        ConfirmTemplate {
            username: user.username.into_inner(),
            burger: in_progress.burger,
            lines: in_progress.order.ingredients,
        },
    )
        .into_response())
}

/// Confirm the pending order and show the payment form.
#[instrument(skip_all, fields(username = %user.username))]
pub async fn confirm_buy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: ClientSession,
) -> Result<Response> {
    let pending = session.get::<PendingOrderId>(TokenKind::PendingOrder);

    let Some(in_progress) = CheckoutService::new(state.pool(), state.catalog())
        .resume(&user, pending)
        .await?
    else {
        return Ok(Redirect::to("/buying").into_response());
    };

    Ok(PaymentTemplate::new(user.username.into_inner(), in_progress).into_response())
}

/// Quick buy: skip customization and pay for the base burger.
#[instrument(skip(state, user), fields(username = %user.username))]
pub async fn quick_buy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(selection): Form<BurgerSelection>,
) -> Result<Response> {
    let checkout = CheckoutService::new(state.pool(), state.catalog());
    let burger = checkout.burger(selection.burger_id).await?;
    let in_progress = checkout
        .start(&user, burger.id, &burger.default_lines())
        .await?;

    let mut cookies = SessionCookies::new(&state);
    cookies.issue(TokenKind::PendingOrder, &in_progress.order.id, PENDING_ORDER_TTL)?;

    Ok((
        cookies,
        PaymentTemplate::new(user.username.into_inner(), in_progress),
    )
        .into_response())
}

/// Pay for the pending order.
///
/// The card number, CVV and phone are checked before anything is read or
/// written.
#[instrument(skip_all, fields(username = %user.username))]
pub async fn finish_buy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: ClientSession,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    let details = form.validate().inspect_err(|e| {
        tracing::warn!(error = %e, "Rejected payment form");
    })?;

    let checkout = CheckoutService::new(state.pool(), state.catalog());
    let pending = session.get::<PendingOrderId>(TokenKind::PendingOrder);
    let Some(completed) = checkout.complete(&user, pending, &details).await? else {
        return Ok(Redirect::to("/buying").into_response());
    };

    let now = Utc::now();
    let window = state.config().delivery_window;
    let delivery = DeliveryStatus::start(now, window);
    let delivery_view = DeliveryView::at(&delivery, now).ok_or_else(|| {
        AppError::Internal("delivery window already elapsed".to_string())
    })?;

    let mut cookies = SessionCookies::new(&state);
    cookies
        .issue(TokenKind::Purchase, &true, PURCHASE_TOKEN_TTL)?
        .issue(TokenKind::Delivery, &delivery, window)?
        .clear(TokenKind::PendingOrder);

    Ok((
        cookies,
        DoneTemplate {
            username: user.username.into_inner(),
            burger_name: completed.burger.name,
            lines: completed.customized.ingredients,
            transaction_id: completed.transaction.id.to_string(),
            masked_card: details.payment.card_number.masked(),
            delivery: delivery_view,
        },
    )
        .into_response())
}

/// Acknowledge the confirmation page.
pub async fn done_buy(RequireAuth(_user): RequireAuth, _purchase: RequirePurchase) -> Redirect {
    Redirect::to("/onWay")
}

/// Display the "on its way" page.
pub async fn on_way(
    RequireAuth(user): RequireAuth,
    _purchase: RequirePurchase,
    session: ClientSession,
) -> impl IntoResponse {
    let delivery = session
        .get::<DeliveryStatus>(TokenKind::Delivery)
        .and_then(|status| DeliveryView::at(&status, Utc::now()));

    OnWayTemplate {
        username: user.username.into_inner(),
        delivery,
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Read the customization form: repeated `ingredient` / `quantity` pairs.
///
/// The `n`th quantity belongs to the `n`th ingredient.
fn parse_ingredient_form(body: &[u8]) -> Vec<IngredientLine> {
    let mut names = Vec::new();
    let mut quantities = Vec::new();

    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "ingredient" => names.push(value.into_owned()),
            "quantity" => quantities.push(value.into_owned()),
            _ => {}
        }
    }

    normalize_ingredients(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), quantities.get(i).map(String::as_str))),
    )
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_parse_ingredient_form() {
        let body = b"ingredient=bun&quantity=1&ingredient=cheese&quantity=3\
            &ingredient=onion&quantity=0&ingredient=&quantity=1\
            &ingredient=pickle%20slices&quantity=";
        assert_eq!(
            parse_ingredient_form(body),
            vec![
                IngredientLine::new("bun", 1),
                IngredientLine::new("cheese", 3),
                IngredientLine::new("pickle slices", 1),
            ]
        );
    }

    #[test]
    fn test_parse_ingredient_form_merges_and_clamps() {
        let body = b"ingredient=cheese&quantity=7&ingredient=cheese&quantity=9";
        assert_eq!(
            parse_ingredient_form(body),
            vec![IngredientLine::new("cheese", 10)]
        );
    }

    #[test]
    fn test_parse_ingredient_form_empty() {
        assert!(parse_ingredient_form(b"").is_empty());
        assert!(parse_ingredient_form(b"ingredient=bun&quantity=0").is_empty());
    }

    #[test]
    fn test_delivery_view() {
        let now = Utc::now();
        let status = DeliveryStatus::start(now, Duration::minutes(30));
        let view = DeliveryView::at(&status, now + Duration::minutes(10)).unwrap_or_else(|| {
            panic!("delivery should still be running");
        });
        assert_eq!(view.minutes_remaining, 20);
        assert_eq!(view.message, "Your order is on its way!");
        assert_eq!(DeliveryView::at(&status, now + Duration::minutes(31)), None);
    }
}
