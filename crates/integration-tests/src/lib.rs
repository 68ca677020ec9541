//! Integration tests for Burgershop.
//!
//! # Running Tests
//!
//! ```bash
//! # Point the tests at a scratch database; migrations are applied on start
//! export BURGERSHOP_TEST_DATABASE_URL=postgres://localhost/burgershop_test
//!
//! cargo test -p burgershop-integration-tests -- --ignored
//! ```
//!
//! Each test serves the storefront on an ephemeral port against that
//! database and drives it over HTTP with a cookie-keeping client. Usernames
//! and burger names carry a random suffix so tests can share a database.

use std::net::SocketAddr;

use burgershop_storefront::config::{LogFormat, StorefrontConfig};
use burgershop_storefront::routes;
use burgershop_storefront::state::AppState;
use chrono::Duration;
use reqwest::{Client, Response, redirect};
use secrecy::SecretString;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use url::Url;
use uuid::Uuid;

/// Password used for every account created by the tests.
pub const PASSWORD: &str = "correct horse battery";

/// A running storefront plus a direct handle on its database.
pub struct TestContext {
    pub base_url: String,
    pub pool: PgPool,
    pub state: AppState,
}

impl TestContext {
    /// Migrate the test database and serve the storefront on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if no test database is configured or reachable.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("BURGERSHOP_TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("BURGERSHOP_TEST_DATABASE_URL not set");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("../storefront/migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr: SocketAddr = listener.local_addr().expect("No local address");
        let base_url = format!("http://{addr}");

        let config = StorefrontConfig {
            database_url: SecretString::from(database_url),
            host: addr.ip(),
            port: addr.port(),
            base_url: Url::parse(&base_url).expect("Invalid base URL"),
            session_secret: SecretString::from("Vq8#nT2!pL6@xR4$wK9^mZ3&cJ7*hB5e"),
            delivery_window: Duration::minutes(30),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state = AppState::new(config, pool.clone()).expect("Failed to build state");

        let app = routes::app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            base_url,
            pool,
            state,
        }
    }

    /// A client that keeps cookies and does not follow redirects.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a form.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post(&self, client: &Client, path: &str, form: &[(&str, &str)]) -> Response {
        client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Request failed")
    }

    /// GET a page.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, client: &Client, path: &str) -> Response {
        client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    /// Register a fresh user; `client` ends up logged in as them.
    ///
    /// # Panics
    ///
    /// Panics if registration does not redirect to the menu.
    pub async fn register(&self, client: &Client, prefix: &str) -> String {
        let username = unique_name(prefix);
        let resp = self
            .post(
                client,
                "/create-user",
                &[("username", username.as_str()), ("password", PASSWORD)],
            )
            .await;
        assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/buying");
        username
    }
}

/// A name with a random suffix, short enough for a username.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(12).collect();
    format!("{prefix}_{suffix}")
}

/// The `Location` header of a redirect.
///
/// # Panics
///
/// Panics if the response has no valid `Location` header.
#[must_use]
pub fn location(resp: &Response) -> &str {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("Response has no Location header")
}

/// A complete, valid payment form.
#[must_use]
pub fn payment_form(card: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("card_number", card),
        ("expiry_date", "09/28"),
        ("cvv", "123"),
        ("payment_method", "credit_card"),
        ("phone", "5551234567"),
        ("email", "shopper@example.com"),
        ("house_number", "12"),
        ("street", "Main St"),
        ("city", "Springfield"),
        ("postal_code", "12345"),
    ]
}
