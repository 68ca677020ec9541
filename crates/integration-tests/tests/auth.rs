//! Registration, login and logout against a real database.
//!
//! Requires a `PostgreSQL` database; see the crate docs.

use burgershop_integration_tests::{PASSWORD, TestContext, location, unique_name};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_duplicate_username_is_rejected() {
    let ctx = TestContext::new().await;
    let first = ctx.client();
    let username = ctx.register(&first, "dup").await;

    let second = ctx.client();
    let resp = ctx
        .post(
            &second,
            "/create-user",
            &[("username", username.as_str()), ("password", "another password")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("set-cookie").is_none());
    let body = resp.text().await.expect("body");
    assert!(body.contains("Username already exists"));

    // The first account still logs in with its own password
    let resp = ctx
        .post(
            &second,
            "/login",
            &[("username", username.as_str()), ("password", PASSWORD)],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/buying");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_login_issues_user_token() {
    let ctx = TestContext::new().await;
    let username = ctx.register(&ctx.client(), "login").await;

    let client = ctx.client();
    let resp = ctx.get(&client, "/buying").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = ctx
        .post(
            &client,
            "/login",
            &[("username", username.as_str()), ("password", PASSWORD)],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let set_cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("login sets a cookie");
    assert!(set_cookie.starts_with("bs_user="));
    assert!(set_cookie.contains("HttpOnly"));

    let resp = ctx.get(&client, "/buying").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains(&username));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_login_failures_render_landing_page() {
    let ctx = TestContext::new().await;
    let username = ctx.register(&ctx.client(), "fail").await;
    let client = ctx.client();

    let resp = ctx
        .post(
            &client,
            "/login",
            &[("username", username.as_str()), ("password", "wrong password")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("Invalid password"));

    let stranger = unique_name("nobody");
    let resp = ctx
        .post(
            &client,
            "/login",
            &[("username", stranger.as_str()), ("password", PASSWORD)],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("User not found"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_logout_ends_session() {
    let ctx = TestContext::new().await;
    let client = ctx.client();
    ctx.register(&client, "bye").await;

    assert_eq!(ctx.get(&client, "/profile").await.status(), StatusCode::OK);

    let resp = ctx.post(&client, "/logout", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = ctx.get(&client, "/profile").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_readiness_with_database() {
    let ctx = TestContext::new().await;
    let resp = ctx.get(&ctx.client(), "/health/ready").await;
    assert_eq!(resp.status(), StatusCode::OK);
}
