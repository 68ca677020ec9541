//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Landing page (login + registration forms)
//! GET  /login                      - Redirect to /
//! POST /login                      - Login action
//! POST /create-user                - Registration action
//! POST /logout                     - Clear every session token
//!
//! # Catalog (requires auth)
//! GET  /buying                     - Menu
//! GET  /create-burger              - "Create burger" form
//! POST /create-burger              - Create burger action
//!
//! # Checkout (requires auth)
//! POST /customize                  - Pick a burger, redirect to /edit/{id}
//! GET  /edit/{id}                  - Customization form
//! POST /edit/{id}                  - Submit customization (pending order)
//! POST /confirmBuy                 - Payment form for the pending order
//! POST /buy                        - Quick buy with base ingredients
//! POST /finishbuy                  - Validate payment, place order
//! POST /donebuy                    - Acknowledge (requires purchase)
//! GET  /onWay                      - Delivery status (requires purchase)
//!
//! # Account (requires auth)
//! GET  /profile                    - Customized burgers, transactions, delivery
//! GET  /transactions/{id}/edit     - Edit form (owner only)
//! POST /transactions/{id}/edit     - Update action (owner only)
//!
//! # Health
//! GET  /health                     - Liveness
//! GET  /health/ready               - Database readiness
//! ```

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod home;
pub mod profile;
pub mod transactions;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/login", get(home::login_page).post(auth::login))
        .route("/create-user", post(auth::create_user))
        .route("/logout", post(auth::logout))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/buying", get(catalog::buying))
        .route(
            "/create-burger",
            get(catalog::create_burger_page).post(catalog::create_burger),
        )
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/customize", post(checkout::customize))
        .route("/edit/{id}", get(checkout::edit_page).post(checkout::edit))
        .route("/confirmBuy", post(checkout::confirm_buy))
        .route("/buy", post(checkout::quick_buy))
        .route("/finishbuy", post(checkout::finish_buy))
        .route("/donebuy", post(checkout::done_buy))
        .route("/onWay", get(checkout::on_way))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::profile))
        .route(
            "/transactions/{id}/edit",
            get(transactions::edit_page).post(transactions::update),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes())
        .merge(catalog_routes())
        .merge(checkout_routes())
        .merge(account_routes())
}

/// Build the application: routes, request IDs and request tracing.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration as StdDuration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request as HttpRequest, StatusCode, header};
    use axum::response::Response;
    use chrono::{Duration, Utc};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use url::Url;

    use burgershop_core::{PendingOrderId, UserId, Username};

    use super::*;
    use crate::config::{LogFormat, StorefrontConfig};
    use crate::models::session::{CurrentUser, DeliveryStatus, TokenKind};

    // No request below may reach the database: the pool points nowhere.
    fn test_state() -> AppState {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://nobody@127.0.0.1:1/none"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            base_url: Url::parse("http://localhost:5000").unwrap(),
            session_secret: SecretString::from("k3Jd9!vQ2@mZ7#pL5$wX1^bN8&cR4*tY"),
            delivery_window: Duration::minutes(30),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(StdDuration::from_millis(100))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        AppState::new(config, pool).unwrap()
    }

    fn token_cookie<T: serde::Serialize>(state: &AppState, kind: TokenKind, data: &T) -> String {
        let token = state
            .tokens()
            .sign(kind, data, Utc::now() + Duration::hours(1))
            .unwrap();
        format!("{}={token}", kind.cookie_name())
    }

    fn user_cookie(state: &AppState) -> String {
        let user = CurrentUser {
            id: UserId::new(1),
            username: Username::parse("alice").unwrap(),
        };
        token_cookie(state, TokenKind::User, &user)
    }

    async fn send(state: &AppState, request: HttpRequest<Body>) -> Response {
        app(state.clone()).oneshot(request).await.unwrap()
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn post_form(uri: &str, cookie: &str, body: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn payment_body(card: &str, cvv: &str, phone: &str) -> String {
        format!(
            "card_number={card}&expiry_date=09%2F28&cvv={cvv}&payment_method=credit_card\
             &phone={phone}&email=alice%40example.com&house_number=12&street=Main+St\
             &city=Springfield&postal_code=12345"
        )
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state();
        let response = send(&state, get_with_cookie("/health", "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_upstream_request_id_is_echoed_when_sane() {
        let state = test_state();
        let request = HttpRequest::builder()
            .uri("/health")
            .header("x-request-id", "edge-42")
            .body(Body::empty())
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(response.headers()["x-request-id"], "edge-42");

        let request = HttpRequest::builder()
            .uri("/health")
            .header("x-request-id", "not a token")
            .body(Body::empty())
            .unwrap();
        let response = send(&state, request).await;
        let echoed = response.headers()["x-request-id"].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(echoed).is_ok());
    }

    #[tokio::test]
    async fn test_buying_without_token_redirects_to_landing() {
        let state = test_state();
        for uri in ["/buying", "/buying?page=2&force=true"] {
            let response = send(&state, get_with_cookie(uri, "")).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), "/");
        }
    }

    #[tokio::test]
    async fn test_tampered_token_is_ignored() {
        let state = test_state();
        let mut cookie = user_cookie(&state);
        cookie.push('x');
        let response = send(&state, get_with_cookie("/profile", &cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_token_under_wrong_cookie_is_ignored() {
        let state = test_state();
        let user = CurrentUser {
            id: UserId::new(1),
            username: Username::parse("alice").unwrap(),
        };
        let token = state
            .tokens()
            .sign(TokenKind::Purchase, &user, Utc::now() + Duration::hours(1))
            .unwrap();
        let response = send(&state, get_with_cookie("/buying", &format!("bs_user={token}"))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_logout_clears_tokens_then_buying_redirects() {
        let state = test_state();
        let cookie = user_cookie(&state);

        let response = send(&state, post_form("/logout", &cookie, "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let cleared: Vec<&str> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        for kind in TokenKind::ALL {
            let prefix = format!("{}=;", kind.cookie_name());
            assert!(
                cleared.iter().any(|c| c.starts_with(&prefix) && c.contains("Max-Age=0")),
                "{} not cleared",
                kind.cookie_name()
            );
        }

        // The browser now sends no token.
        let response = send(&state, get_with_cookie("/buying", "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_login_page_redirects_to_landing() {
        let state = test_state();
        let response = send(&state, get_with_cookie("/login", "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_landing_page_shows_user() {
        let state = test_state();
        let response = send(&state, get_with_cookie("/", &user_cookie(&state))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("alice"));
    }

    #[tokio::test]
    async fn test_finishbuy_rejects_short_card_number() {
        let state = test_state();
        let body = payment_body("12345", "123", "1234567890");
        let response = send(&state, post_form("/finishbuy", &user_cookie(&state), &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Card number must be 16 digits");
    }

    #[tokio::test]
    async fn test_finishbuy_rejects_short_cvv() {
        let state = test_state();
        let body = payment_body("1234567890123456", "12", "1234567890");
        let response = send(&state, post_form("/finishbuy", &user_cookie(&state), &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "CVV must be 3 digits");
    }

    #[tokio::test]
    async fn test_finishbuy_rejects_short_phone() {
        let state = test_state();
        let body = payment_body("1234567890123456", "123", "12345");
        let response = send(&state, post_form("/finishbuy", &user_cookie(&state), &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Phone number must be 10 digits");
    }

    #[tokio::test]
    async fn test_finishbuy_valid_fields_without_pending_order() {
        // All checks pass; with no pending order the shopper goes back to the menu.
        let state = test_state();
        let body = payment_body("1234567890123456", "123", "1234567890");
        let response = send(&state, post_form("/finishbuy", &user_cookie(&state), &body)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/buying");
    }

    #[tokio::test]
    async fn test_finishbuy_requires_login_before_validation() {
        let state = test_state();
        let body = payment_body("12345", "1", "1");
        let response = send(&state, post_form("/finishbuy", "", &body)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_confirm_buy_without_pending_order() {
        let state = test_state();
        let response = send(&state, post_form("/confirmBuy", &user_cookie(&state), "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/buying");
    }

    #[tokio::test]
    async fn test_pending_token_for_wrong_kind_is_ignored() {
        let state = test_state();
        let cookie = format!(
            "{}; {}",
            user_cookie(&state),
            token_cookie(&state, TokenKind::Delivery, &PendingOrderId::generate())
                .replace("bs_delivery", "bs_pending"),
        );
        let response = send(&state, post_form("/confirmBuy", &cookie, "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/buying");
    }

    #[tokio::test]
    async fn test_empty_customization_is_rejected() {
        let state = test_state();
        let body = "ingredient=bun&quantity=0&ingredient=+&quantity=2";
        let response = send(&state, post_form("/edit/1", &user_cookie(&state), body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_on_way_requires_purchase() {
        let state = test_state();
        let response = send(&state, get_with_cookie("/onWay", &user_cookie(&state))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/buying");

        let response = send(&state, post_form("/donebuy", &user_cookie(&state), "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/buying");
    }

    #[tokio::test]
    async fn test_on_way_without_login_goes_to_landing() {
        let state = test_state();
        let purchase = token_cookie(&state, TokenKind::Purchase, &true);
        let response = send(&state, get_with_cookie("/onWay", &purchase)).await;
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_on_way_shows_delivery_status() {
        let state = test_state();
        let delivery = DeliveryStatus::start(Utc::now(), Duration::minutes(30));
        let cookie = format!(
            "{}; {}; {}",
            user_cookie(&state),
            token_cookie(&state, TokenKind::Purchase, &true),
            token_cookie(&state, TokenKind::Delivery, &delivery),
        );

        let response = send(&state, get_with_cookie("/onWay", &cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Your order is on its way!"));

        let response = send(&state, post_form("/donebuy", &cookie, "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/onWay");
    }

    #[tokio::test]
    async fn test_transaction_edit_checks_ownership_before_the_form() {
        // The lookup runs first, so even an invalid form reaches the (unreachable) store
        let state = test_state();
        let body = payment_body("1234567890123456", "99", "1234567890");
        let response = send(
            &state,
            post_form("/transactions/1/edit", &user_cookie(&state), &body),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
