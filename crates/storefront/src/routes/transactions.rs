//! Transaction edit route handlers (owner only).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use burgershop_core::{PaymentMethod, TransactionId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::transaction::PaymentForm;
use crate::services::transactions::TransactionService;
use crate::state::AppState;

/// Transaction edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "transaction_edit.html")]
pub struct TransactionEditTemplate {
    pub username: String,
    pub transaction_id: String,
    pub masked_card: String,
    pub form: PaymentForm,
    pub methods: Vec<(&'static str, &'static str)>,
}

/// Display the edit form for one of the user's transactions.
#[instrument(skip(state, user), fields(username = %user.username))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<TransactionId>,
) -> Result<impl IntoResponse> {
    let transaction = TransactionService::new(state.pool())
        .find_owned(id, &user.username)
        .await?;

    Ok(TransactionEditTemplate {
        username: user.username.into_inner(),
        transaction_id: transaction.id.to_string(),
        masked_card: transaction.details.payment.card_number.masked(),
        form: PaymentForm::prefill(&transaction.details),
        methods: PaymentMethod::ALL
            .iter()
            .map(|m| (m.as_str(), m.label()))
            .collect(),
    })
}

/// Update one of the user's transactions.
///
/// Another user's transaction answers 403, even for an invalid form, and is
/// left unchanged.
#[instrument(skip(state, user, form), fields(username = %user.username))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<TransactionId>,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    TransactionService::new(state.pool())
        .update_owned(id, &user.username, &form)
        .await?;

    Ok(Redirect::to("/profile").into_response())
}
